/// Concatenates string-like values into a `String` allocated once with the exact capacity.
#[macro_export]
macro_rules! concat_string {
  () => {
    String::new()
  };
  ($($s:expr),+ $(,)?) => {{
    let mut len = 0;
    $(len += AsRef::<str>::as_ref(&$s).len();)+
    let mut buf = String::with_capacity(len);
    $(buf.push_str(AsRef::<str>::as_ref(&$s));)+
    buf
  }};
}

#[test]
fn test_concat_string() {
  let count = 3;
  let name = String::from("foo");
  assert_eq!(concat_string!(name, "$", itoa::Buffer::new().format(count)), "foo$3");
  assert_eq!(concat_string!("a", "b", 'c'.to_string()), "abc");
}
