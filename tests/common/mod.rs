/// Runs a fixture from `tests/target/<scope>/<file>.lox`.
///
/// `is OK` drives the interpreter in-process with a captured output buffer
/// and compares stdout line by line. `is ERR(code)` spawns the `rlox` binary
/// and asserts the stderr lines and the exact process exit code.
#[macro_export]
macro_rules! tests {
    ($file:ident in $scope:ident is OK $($expected:expr)*) => {
        #[test]
        fn $file() {
            use rlox_lang::Lox;

            let mut expected = vec![$($expected),*];

            // If there are expected lines, join them with a trailing new line.
            let expected = match expected.len() {
                0 => "".to_string(),
                _ => {
                    expected.push("");
                    expected.join("\n")
                }
            };

            let mut output = Vec::new();
            let mut lox = Lox::new(&mut output);

            lox.run_file(&format!("tests/target/{}/{}.lox", stringify!($scope), stringify!($file)));

            // drop lox here to release the borrow on output before reading it
            drop(lox);
            assert_eq!(expected, std::str::from_utf8(&output).unwrap());
        }
    };

    ($file:ident in $scope:ident is ERR($code:expr) $($expected:expr)+) => {
        #[test]
        fn $file() {
            use assert_cmd::Command;

            let output = vec![$($expected),+].join("\n");
            let file = format!("tests/target/{}/{}.lox", stringify!($scope), stringify!($file));

            Command::cargo_bin("rlox").unwrap()
                .arg(file)
                .assert()
                .stderr(format!("{output}\n"))
                .code($code);
        }
    };
}
