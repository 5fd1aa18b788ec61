/// Build a row of `(column, value)` pairs for the insert/update setters.
///
/// Keys keep the written order, which is the column order of
/// [`insert_map`](crate::QueryBuilder::insert_map).
///
/// ```ignore
/// use myqb::{row, table};
///
/// table("t_user").insert_map(row! { "name" => "nick", "age" => 23 });
/// ```
#[macro_export]
macro_rules! row {
    () => {
        ::std::vec::Vec::<(::std::string::String, $crate::Value)>::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {
        ::std::vec![$((::std::string::String::from($key), $crate::Value::from($value))),+]
    };
}

#[cfg(test)]
mod tests {
    use crate::Value;

    #[test]
    fn row_keeps_order() {
        let r = row! { "name" => "nick", "age" => 23, "vip" => None::<bool> };
        assert_eq!(
            r,
            vec![
                ("name".to_string(), Value::from("nick")),
                ("age".to_string(), Value::Int(23)),
                ("vip".to_string(), Value::Null),
            ]
        );
        assert!(row! {}.is_empty());
    }
}
