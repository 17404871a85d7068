use std::{collections::BTreeMap, str::Lines};

use interpreter::{InterpretError, Interpreter};
use itertools::Itertools;
use lazy_regex::regex;
use test_suite_proc_macro::generate_tests;

use pretty_assertions::assert_eq;

pub fn test_runtime_errors_line_by_line(
    lines: Lines<'_>,
    expected_runtime_errors: &BTreeMap<usize, String>,
    expected_output: &[String],
) {
    let mut output = Vec::new();

    let mut actual_runtime_errors = BTreeMap::new();
    for (i, line) in lines.enumerate() {
        match Interpreter::new(&mut output).run_source(line) {
            Ok(()) => (),
            Err(InterpretError::Runtime(e)) => {
                actual_runtime_errors.insert(i + 1, e.error().to_string());
            }
            Err(e) => panic!("Unexpected error: {:?}", e),
        }
    }

    assert_eq!(actual_runtime_errors, *expected_runtime_errors,
        "Actual runtime errors (left) do not match expected runtime errors (right)");
    assert_eq!(
        String::from_utf8(output).unwrap().lines().collect_vec(),
        expected_output,
        "Actual output (left) does not match expected output (right)"
    );
}

pub fn holo_expect(code: &str) {
    let mut expected_compile_errors = vec![];
    let mut expected_runtime_errors = BTreeMap::new();
    let mut expected_output = vec![];

    let compile_error_regex = regex!(r"// (Error( at '.*'| at end)?: .*)");
    let runtime_error_regex = regex!(r"// runtime error: (.*)");
    let output_regex = regex!(r"// expect: (.*)");

    for (i, line) in code.lines().enumerate() {
        if let Some(cap) = runtime_error_regex.captures(line) {
            expected_runtime_errors.insert(i + 1, cap[1].to_string());
        } else if let Some(cap) = compile_error_regex.captures(line) {
            expected_compile_errors.push(format!("[line {}] {}", i + 1, &cap[1]));
        } else if let Some(cap) = output_regex.captures(line) {
            expected_output.push(cap[1].to_string());
        }
    }

    if !expected_runtime_errors.is_empty() {
        assert!(
            expected_compile_errors.is_empty(),
            "Can't have a runtime error when there are compile errors."
        );
    }

    if expected_runtime_errors.len() > 1 {
        test_runtime_errors_line_by_line(code.lines(), &expected_runtime_errors, &expected_output);
        return;
    }

    let mut output = Vec::new();
    let result = Interpreter::new(&mut output).run_source(code);
    match result {
        Ok(()) => {
            assert_eq!(expected_output, String::from_utf8(output).unwrap().lines().collect_vec());

            assert!(expected_runtime_errors.is_empty(), "Expected runtime error but none occurred");
            assert!(
                expected_compile_errors.is_empty(),
                "Expected compile errors but none occurred"
            );
        }
        Err(InterpretError::Runtime(runtime_error)) => {
            assert_eq!(
                expected_output,
                String::from_utf8(output).unwrap().lines().collect_vec()
            );
            let (line, message) = expected_runtime_errors
                .iter()
                .next()
                .unwrap_or_else(|| panic!("Unexpected runtime error: {runtime_error}"));
            assert_eq!(message, &runtime_error.error().to_string());
            assert_eq!(*line, runtime_error.token().line().0);

            assert!(
                expected_compile_errors.is_empty(),
                "Expected compile errors but none occurred"
            );
        }
        Err(compile_error) => {
            assert!(output.is_empty(), "Nothing may run when the program does not compile");
            assert!(expected_runtime_errors.is_empty());

            assert_eq!(compile_error.to_string(), expected_compile_errors.join("\n"));
        }
    }
}

generate_tests!();
