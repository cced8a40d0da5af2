#[macro_use]
mod common;

#[cfg(test)]
mod class {
    tests! {
        print_class in class is OK
        "<class Foo>"
    }

    tests! {
        print_instance in class is OK
        "Foo instance"
    }

    tests! {
        method in class is OK
        "hello"
    }
}
