#[macro_use]
mod common;

#[cfg(test)]
mod this {
    tests! {
        in_method in this is OK
        "hi lox"
    }

    tests! {
        bound_method_keeps_this in this is OK
        "1"
        "2"
    }

    tests! {
        outside_class in this is ERR(65)
        "[line 1:7] Error at 'this': Cannot use 'this' outside of a class"
    }

    tests! {
        in_function_outside_class in this is ERR(65)
        "[line 2:10] Error at 'this': Cannot use 'this' outside of a class"
    }
}
