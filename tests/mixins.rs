#![cfg(test)]

#[macro_use]
mod macros;

test!(
    guard_and_default_fallback,
    ".m(@x) when (@x > 0) { v: pos; }\n.m(@x) when (default()) { v: neg; }\n.a{.m(1);}\n.b{.m(-1);}\n",
    ".a {\n  v: pos;\n}\n\n.b {\n  v: neg;\n}\n"
);

test!(
    default_parameter_value,
    ".m(@x: 5px) { w: @x; }\n.a { .m(); }\n.b { .m(10px); }\n",
    ".a {\n  w: 5px;\n}\n\n.b {\n  w: 10px;\n}\n"
);

test!(
    variadic_parameter,
    ".m(@a, @rest...) { first: @a; }\n.a { .m(1, 2, 3); }\n",
    ".a {\n  first: 1;\n}\n"
);

test!(
    literal_pattern_selects_matching_definition,
    ".m(dark, @x) { v: dark @x; }\n.m(light, @x) { v: light @x; }\n.a { .m(dark, 1); }\n.b { .m(light, 2); }\n",
    ".a {\n  v: dark 1;\n}\n\n.b {\n  v: light 2;\n}\n"
);

error!(
    literal_pattern_rejects_non_matching_call,
    ".m(dark, @x) { v: dark @x; }\n.s { .m(blue, 1); }\n",
    "No matching definition"
);

test!(
    named_argument,
    ".m(@a, @b) { x: @a; y: @b; }\n.s { .m(@b: 2, @a: 1); }\n",
    ".s {\n  x: 1;\n  y: 2;\n}\n"
);

test!(
    important_call_marks_every_declaration,
    ".m() { a: 1; b: 2; }\n.s { .m() !important; }\n",
    ".s {\n  a: 1 !important;\n  b: 2 !important;\n}\n"
);

error!(
    no_matching_arity,
    ".m(@a, @b) { x: @a; }\n.s { .m(1); }\n",
    "No matching definition"
);

error!(
    undefined_mixin,
    ".s { .nope(); }\n",
    "No matching definition was found for `.nope"
);
