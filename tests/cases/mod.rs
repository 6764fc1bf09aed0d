#![allow(dead_code)]

use sift::{Engine, Error, Value};

/// Run `filter` on the JSON text `input`, collecting every output in
/// compact form. The first error ends the run.
pub fn run_filter(filter: &str, input: &str) -> Result<Vec<String>, Error> {
    let engine = Engine::default();
    let filter = engine.compile(filter)?;
    let input = engine.parse_json(input)?;
    filter
        .run(input)
        .map(|output| output.map(|value| value.to_string()).map_err(Error::from))
        .collect()
}

/// Like `run_filter`, keeping the outputs produced before an error.
pub fn run_partial(filter: &str, input: &str) -> (Vec<String>, Option<Error>) {
    let engine = Engine::default();
    let filter = match engine.compile(filter) {
        Ok(filter) => filter,
        Err(err) => return (vec![], Some(err)),
    };
    let input = match engine.parse_json(input) {
        Ok(input) => input,
        Err(err) => return (vec![], Some(err)),
    };
    let mut outputs = vec![];
    for output in filter.run(input) {
        match output {
            Ok(value) => outputs.push(value.to_string()),
            Err(err) => return (outputs, Some(err.into())),
        }
    }
    (outputs, None)
}

pub fn compact(json: &str) -> String {
    Value::parse(json).to_string()
}

/// Declares a test running one filter on one input.
///
/// ```ignore
/// test_case!(
///     name,
///     filter: ".a[]",
///     input: r#"{"a": [1, 2]}"#,
///     outputs: ["1", "2"],
/// );
/// ```
///
/// Expected outputs are JSON text, compared after compacting. Instead of
/// `outputs`, a case may state `error: "message"` (evaluation error after
/// `before` outputs), `compile_error: "C001"` (diagnostic code) or
/// `syntax_error` (invalid JSON input).
#[macro_export]
macro_rules! test_case {
    (
        $name:ident,
        filter: $filter:expr,
        input: $input:expr,
        outputs: [$($output:expr),* $(,)?] $(,)?
    ) => {
        #[test]
        fn $name() {
            let expected: Vec<String> = vec![$($crate::cases::compact($output)),*];
            match $crate::cases::run_filter($filter, $input) {
                Ok(outputs) => pretty_assertions::assert_eq!(outputs, expected),
                Err(err) => panic!("{} failed: {}", $filter, err),
            }
        }
    };
    (
        $name:ident,
        filter: $filter:expr,
        input: $input:expr,
        $(before: [$($output:expr),* $(,)?],)?
        error: $message:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            #[allow(unused_mut)]
            let mut expected: Vec<String> = vec![];
            $($(expected.push($crate::cases::compact($output));)*)?
            let (outputs, err) = $crate::cases::run_partial($filter, $input);
            pretty_assertions::assert_eq!(outputs, expected);
            match err {
                Some(err) => pretty_assertions::assert_eq!(err.message(), $message),
                None => panic!("{} did not fail", $filter),
            }
        }
    };
    (
        $name:ident,
        filter: $filter:expr,
        compile_error: $code:expr $(,)?
    ) => {
        #[test]
        fn $name() {
            match sift::Engine::default().compile($filter) {
                Err(sift::Error::Compilation { diagnostic, .. }) => {
                    pretty_assertions::assert_eq!(diagnostic.code.as_deref(), Some($code));
                }
                Err(err) => panic!("{} failed with {:?}", $filter, err),
                Ok(_) => panic!("{} compiled", $filter),
            }
        }
    };
    (
        $name:ident,
        input: $input:expr,
        syntax_error $(,)?
    ) => {
        #[test]
        fn $name() {
            match sift::Engine::default().parse_json($input) {
                Err(sift::Error::Syntax { .. }) => {}
                other => panic!("{:?} parsed as {:?}", $input, other),
            }
        }
    };
}
