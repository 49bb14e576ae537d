#![cfg(test)]

/// Compile `$input` and assert the emitted CSS equals `$output` exactly.
macro_rules! test {
    ($name:ident, $input:expr, $output:expr) => {
        #[test]
        fn $name() {
            let result = lessc_core::compile($input, &lessc_core::Options::new());
            match result {
                Ok(out) => pretty_assertions::assert_eq!(out.css, $output),
                Err(e) => panic!("expected successful compile, got error: {e}"),
            }
        }
    };
    ($name:ident, $input:expr, $output:expr, $options:expr) => {
        #[test]
        fn $name() {
            let result = lessc_core::compile($input, &$options);
            match result {
                Ok(out) => pretty_assertions::assert_eq!(out.css, $output),
                Err(e) => panic!("expected successful compile, got error: {e}"),
            }
        }
    };
}

/// Compile `$input` and assert it fails, with the error's `Display` text
/// containing `$message`.
macro_rules! error {
    ($name:ident, $input:expr, $message:expr) => {
        #[test]
        fn $name() {
            let result = lessc_core::compile($input, &lessc_core::Options::new());
            match result {
                Ok(out) => panic!("expected an error, got: {:?}", out.css),
                Err(e) => {
                    let text = e.to_string();
                    assert!(
                        text.contains($message),
                        "error {text:?} did not contain {:?}",
                        $message
                    );
                }
            }
        }
    };
}
