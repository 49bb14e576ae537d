#![cfg(test)]

#[macro_use]
mod macros;

test!(
    comma_merge_joins_in_source_order,
    ".a { background+: url(a.png); background+: url(b.png); }\n",
    ".a {\n  background: url(a.png), url(b.png);\n}\n"
);

test!(
    space_merge_joins_with_spaces,
    ".a { transform+_: scale(2); transform+_: rotate(15deg); }\n",
    ".a {\n  transform: scale(2) rotate(15deg);\n}\n"
);

test!(
    important_on_one_merge_member_stays_at_its_own_position,
    ".a { prop+: 1; prop+: 2 !important; prop+: 3; }\n",
    ".a {\n  prop: 1, 2 !important, 3;\n}\n"
);
