#[macro_export]
macro_rules! entry {
    ( $key: expr, $value: expr) => {
        $crate::linked_list::Entry {
            key: $key.into(),
            value: $value.into(),
            next: None,
        }
    };
}
