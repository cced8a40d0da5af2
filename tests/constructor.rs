#[macro_use]
mod common;

#[cfg(test)]
mod constructor {
    tests! {
        init_sets_fields in constructor is OK
        "7"
    }

    tests! {
        arguments in constructor is OK
        "1"
        "2"
    }

    tests! {
        early_return_returns_this in constructor is OK
        "true"
    }

    tests! {
        call_init_explicitly in constructor is OK
        "Foo instance"
    }

    tests! {
        default_arity in constructor is ERR(70)
        "[line 2:6] Error at ')': Expected 0 arguments but got 1"
    }

    tests! {
        return_value in constructor is ERR(65)
        "[line 3:5] Error at 'return': Cannot return a value from an initializer"
    }
}
