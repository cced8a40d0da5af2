#[macro_use]
mod common;

#[cfg(test)]
mod for_stmt {
    tests! {
        count in for_stmt is OK
        "0"
        "1"
        "2"
    }

    tests! {
        missing_clauses in for_stmt is OK
        "0"
        "1"
    }

    tests! {
        closure_in_body in for_stmt is OK
        "1"
    }
}
