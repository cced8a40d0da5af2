#[macro_use]
mod common;

#[cfg(test)]
mod return_stmt {
    tests! {
        early_return in return_stmt is OK
        "early"
    }

    tests! {
        in_while in return_stmt is OK
        "from loop"
    }

    tests! {
        bare_return in return_stmt is OK
        "nil"
    }

    tests! {
        at_top_level in return_stmt is ERR(65)
        "[line 1:1] Error at 'return': Cannot return from top-level code"
    }
}
