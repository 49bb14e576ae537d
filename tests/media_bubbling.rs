#![cfg(test)]

#[macro_use]
mod macros;

test!(
    media_bubbles_enclosing_selector,
    ".a { @media (min-width: 600px) { color: red; } }\n",
    "@media (min-width: 600px) {\n  .a {\n    color: red;\n  }\n}\n"
);

test!(
    media_with_own_declaration_and_nested_ruleset,
    ".a { color: red; @media (min-width: 600px) { .b { color: blue; } } }\n",
    ".a {\n  color: red;\n}\n\n@media (min-width: 600px) {\n  .a .b {\n    color: blue;\n  }\n}\n"
);

test!(
    top_level_media_untouched,
    "@media print { .a { color: black; } }\n",
    "@media print {\n  .a {\n    color: black;\n  }\n}\n"
);

// Spec §8 scenario 6: a detached ruleset's own `@media` combines with an
// outer `@media` wrapped around its call site into one conjunction.
test!(
    detached_ruleset_call_combines_with_outer_media,
    "@dr: { .s { @media (tv) { color: black; } } };\n@media (portrait) { @dr(); }\n",
    "@media (portrait) and (tv) {\n  .s {\n    color: black;\n  }\n}\n"
);

test!(
    nested_supports_combines_into_one_conjunction,
    ".a { @supports (display: grid) { @supports (gap: 1px) { color: red; } } }\n",
    "@supports (display: grid) and (gap: 1px) {\n  .a {\n    color: red;\n  }\n}\n"
);
