#[macro_use]
mod common;

#[cfg(test)]
mod number {
    tests! {
        literals in number is OK
        "123"
        "987654"
        "0"
        "123.456"
        "-0.001"
    }

    tests! {
        decimal_point_requires_digits in number is ERR(65)
        "[line 1:11] Error at ';': Expect property name after '.'"
    }
}
