#![cfg(test)]

#[macro_use]
mod macros;

test!(
    plain_descendant_nesting,
    ".outer { .inner { color: red; } }\n",
    ".outer .inner {\n  color: red;\n}\n"
);

test!(
    parent_selector_reference,
    ".a { color: red; &:hover { color: blue; } }\n",
    ".a {\n  color: red;\n}\n\n.a:hover {\n  color: blue;\n}\n"
);

test!(
    parent_selector_compound,
    ".btn { &.active { color: green; } }\n",
    ".btn.active {\n  color: green;\n}\n"
);

test!(
    multiple_own_selectors_cross_ancestor,
    ".a, .b { .c, .d { color: red; } }\n",
    ".a .c, .a .d, .b .c, .b .d {\n  color: red;\n}\n"
);

test!(
    three_levels_deep,
    ".a { .b { .c { color: red; } } }\n",
    ".a .b .c {\n  color: red;\n}\n"
);
