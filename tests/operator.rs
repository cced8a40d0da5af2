#[macro_use]
mod common;

#[cfg(test)]
mod operator {
    tests! {
        add in operator is OK
        "3"
        "foobar"
        "0.75"
    }

    tests! {
        add_mismatched in operator is ERR(70)
        "[line 1:13] Error at '+': Binary operation '+' is not supported between string type and number type"
    }

    tests! {
        subtract in operator is OK
        "2.5"
        "-1"
    }

    tests! {
        multiply in operator is OK
        "7"
        "0"
    }

    tests! {
        divide in operator is OK
        "4"
        "3.5"
    }

    tests! {
        divide_by_zero in operator is ERR(70)
        "[line 1:8] Error at '/': Division by zero"
    }

    tests! {
        comparison in operator is OK
        "true"
        "true"
        "false"
        "false"
    }

    tests! {
        comparison_mismatched in operator is ERR(70)
        "[line 1:11] Error at '<': Binary operation '<' is not supported between string type and string type"
    }

    tests! {
        equality in operator is OK
        "true"
        "false"
        "false"
        "true"
        "false"
        "true"
        "false"
        "true"
    }

    tests! {
        negate in operator is OK
        "-3"
        "3"
        "false"
        "true"
        "false"
    }

    tests! {
        negate_non_number in operator is ERR(70)
        "[line 1:7] Error at '-': Unary operation '-' is not supported on string type"
    }
}
