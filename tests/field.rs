#[macro_use]
mod common;

#[cfg(test)]
mod field {
    tests! {
        set_and_get in field is OK
        "42"
    }

    tests! {
        fields_shadow_methods in field is OK
        "method"
        "field"
    }

    tests! {
        undefined_property in field is ERR(70)
        "[line 2:13] Error at 'missing': Undefined property 'missing'"
    }

    tests! {
        get_on_non_instance in field is ERR(70)
        "[line 1:13] Error at 'length': Only instances have properties"
    }

    tests! {
        set_on_non_instance in field is ERR(70)
        "[line 1:5] Error at 'x': Only instances have fields"
    }
}
