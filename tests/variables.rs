#![cfg(test)]

#[macro_use]
mod macros;

test!(
    simple_variable,
    "@c: red;\n.a { color: @c; }\n",
    ".a {\n  color: red;\n}\n"
);

test!(
    last_declaration_wins,
    "@c: red;\n@c: blue;\n.a { color: @c; }\n",
    ".a {\n  color: blue;\n}\n"
);

test!(
    forward_reference_within_same_scope,
    ".a { color: @c; }\n@c: green;\n",
    ".a {\n  color: green;\n}\n"
);

test!(
    variable_variable,
    "@c: red;\n@name: c;\n.a { color: @@name; }\n",
    ".a {\n  color: red;\n}\n"
);

test!(
    property_accessor,
    ".a { width: 10px; margin: $width; }\n",
    ".a {\n  width: 10px;\n  margin: 10px;\n}\n"
);

error!(
    undefined_variable,
    ".a { color: @nope; }\n",
    "NameError"
);

error!(
    recursive_variable_definition,
    "@a: @b;\n@b: @a;\n.x { color: @a; }\n",
    "Recursive variable definition"
);
