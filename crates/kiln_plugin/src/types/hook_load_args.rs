#[derive(Debug)]
pub struct OnLoadArgs<'a> {
  pub path: &'a str,
  pub namespace: &'a str,
}
