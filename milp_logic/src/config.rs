extern crate getopts;
use getopts::Options;
use std::env;

#[derive(Clone, Debug)]
pub struct Config {
    /// Big-M used by statements which do not give one explicitly.
    pub default_big_m: i64,
    pub show_variables: bool,
    pub show_indicators: bool,
    pub verbose: bool,
}

impl Config {
    pub const fn default() -> Config {
        Config {
            default_big_m: 1000,
            show_variables: true,
            show_indicators: false,
            verbose: false,
        }
    }

    pub fn parse_from_args() -> Config {
        let args = env::args().collect::<Vec<_>>();
        match Config::parse(&args[1..]) {
            Ok(Some(config)) => config,
            Ok(None) => {
                let brief = format!("Usage: {} [options]", args[0]);
                print!("{}", Config::options(&Config::default()).usage(&brief));
                std::process::exit(0);
            }
            Err(msg) => {
                println!("error: {}", msg);
                std::process::exit(1);
            }
        }
    }

    fn options(config: &Config) -> Options {
        let mut opts = Options::new();
        for (value, name, desc) in config.bool_flags() {
            if value {
                opts.optflag(
                    "",
                    &format!("enable-{}", name),
                    &format!("Enable {} (default).", desc),
                );
                opts.optflag(
                    "",
                    &format!("disable-{}", name),
                    &format!("Disable {}.", desc),
                );
            } else {
                opts.optflag(
                    "",
                    &format!("enable-{}", name),
                    &format!("Enable {}.", desc),
                );
                opts.optflag(
                    "",
                    &format!("disable-{}", name),
                    &format!("Disable {} (default).", desc),
                );
            }
        }
        opts.optopt(
            "",
            "default-big-m",
            "Specify the big-M for statements without an explicit one.",
            "M",
        );
        opts.optflag("h", "help", "Display this help");
        opts
    }

    fn bool_flags(&self) -> [(bool, &'static str, &'static str); 3] {
        [
            (
                self.show_variables,
                "show-variables",
                "listing the column of every named variable",
            ),
            (
                self.show_indicators,
                "show-indicators",
                "listing the column of every auxiliary indicator",
            ),
            (self.verbose, "verbose", "show verbose outputs"),
        ]
    }

    /// Parses command line arguments (without the program name). Returns `Ok(None)` when
    /// help is requested.
    pub fn parse(args: &[String]) -> Result<Option<Config>, String> {
        let mut config = Config::default();
        let opts = Config::options(&config);

        let matches = opts.parse(args).map_err(|f| f.to_string())?;
        if matches.opt_present("h") {
            return Ok(None);
        }

        let mut bool_flags = [
            (&mut config.show_variables, "show-variables"),
            (&mut config.show_indicators, "show-indicators"),
            (&mut config.verbose, "verbose"),
        ];
        for (opt, name) in &mut bool_flags {
            let is_set_enable = matches.opt_present(&format!("enable-{}", name));
            let is_set_disable = matches.opt_present(&format!("disable-{}", name));

            match (is_set_enable, is_set_disable) {
                (true, true) => {
                    return Err(format!(
                        "conflicting options enable-{} and disable-{} are specified at the same time",
                        name, name
                    ));
                }
                (true, false) => **opt = true,
                (false, true) => **opt = false,
                (false, false) => (),
            }
        }

        if let Some(s) = matches.opt_str("default-big-m") {
            let v = s
                .parse::<i64>()
                .map_err(|f| format!("parse failed for --default-big-m: {}", f))?;
            if v <= 0 {
                return Err(String::from("--default-big-m must be positive"));
            }
            config.default_big_m = v;
        }

        Ok(Some(config))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(a: &[&str]) -> Vec<String> {
        a.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() {
        let config = Config::parse(&[]).unwrap().unwrap();
        assert_eq!(config.default_big_m, 1000);
        assert!(config.show_variables);
        assert!(!config.show_indicators);
        assert!(!config.verbose);
    }

    #[test]
    fn test_parse_flags() {
        let config = Config::parse(&args(&[
            "--disable-show-variables",
            "--enable-show-indicators",
            "--enable-verbose",
            "--default-big-m",
            "64",
        ]))
        .unwrap()
        .unwrap();
        assert_eq!(config.default_big_m, 64);
        assert!(!config.show_variables);
        assert!(config.show_indicators);
        assert!(config.verbose);
    }

    #[test]
    fn test_parse_errors() {
        assert!(Config::parse(&args(&["--enable-verbose", "--disable-verbose"])).is_err());
        assert!(Config::parse(&args(&["--default-big-m", "x"])).is_err());
        assert!(Config::parse(&args(&["--default-big-m", "0"])).is_err());
        assert!(Config::parse(&args(&["--no-such-option"])).is_err());
        assert!(Config::parse(&args(&["-h"])).unwrap().is_none());
    }
}
