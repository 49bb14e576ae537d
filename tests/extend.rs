#![cfg(test)]

#[macro_use]
mod macros;

test!(
    basic_extend,
    ".base { color: red; }\n.x:extend(.base) { font: bold; }\n",
    ".base, .x {\n  color: red;\n}\n\n.x {\n  font: bold;\n}\n"
);

test!(
    extend_all_matches_substring,
    ".a.b { color: red; }\n.c:extend(.a all) { font: bold; }\n",
    ".a.b, .c {\n  color: red;\n}\n\n.c {\n  font: bold;\n}\n"
);

test!(
    extend_transitivity,
    ".a:extend(.b) {}\n.b:extend(.c) {}\n.c { color: red; }\n",
    ".c, .b, .a {\n  color: red;\n}\n"
);
