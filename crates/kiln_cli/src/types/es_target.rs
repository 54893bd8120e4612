use clap::ValueEnum;

#[derive(PartialEq, Eq, Clone, Copy, ValueEnum)]
#[clap(rename_all = "lower")]
pub enum ESTarget {
  Es5,
  Es2015,
  Es2016,
  Es2017,
  Es2018,
  Es2019,
  Es2020,
  Es2021,
  Es2022,
  Es2023,
  Es2024,
  EsNext,
}

impl From<ESTarget> for kiln::ESTarget {
  fn from(value: ESTarget) -> Self {
    match value {
      ESTarget::Es5 => kiln::ESTarget::Es5,
      ESTarget::Es2015 => kiln::ESTarget::Es2015,
      ESTarget::Es2016 => kiln::ESTarget::Es2016,
      ESTarget::Es2017 => kiln::ESTarget::Es2017,
      ESTarget::Es2018 => kiln::ESTarget::Es2018,
      ESTarget::Es2019 => kiln::ESTarget::Es2019,
      ESTarget::Es2020 => kiln::ESTarget::Es2020,
      ESTarget::Es2021 => kiln::ESTarget::Es2021,
      ESTarget::Es2022 => kiln::ESTarget::Es2022,
      ESTarget::Es2023 => kiln::ESTarget::Es2023,
      ESTarget::Es2024 => kiln::ESTarget::Es2024,
      ESTarget::EsNext => kiln::ESTarget::EsNext,
    }
  }
}
