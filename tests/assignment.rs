#[macro_use]
mod common;

#[cfg(test)]
mod assignment {
    tests! {
        global in assignment is OK
        "2"
    }

    tests! {
        local in assignment is OK
        "after"
    }

    tests! {
        chained in assignment is OK
        "3"
        "3"
    }

    tests! {
        returns_value in assignment is OK
        "7"
    }

    tests! {
        invalid_target in assignment is ERR(65)
        "[line 1:7] Error at '=': Invalid assignment target"
    }

    tests! {
        undefined in assignment is ERR(70)
        "[line 1:1] Error at 'a': Undefined variable 'a'"
    }
}
