use anyhow::{Result, bail};
use clap::builder::BoolishValueParser;
use clap::{Arg, ArgAction, ArgMatches, Command};
use https_lambdas::login::{self, LoginConfig};
use https_lambdas::weather::{self, WeatherConfig};
use log::debug;

#[derive(Debug)]
enum Handler {
    Weather(WeatherConfig),
    Login(LoginConfig),
}

#[derive(Debug)]
struct Args {
    verbose: bool,
    handler: Handler,
}

fn command() -> Command {
    Command::new("HttpsLambdas")
        .version("0.1")
        .author("Jacob Luszcz")
        .subcommand_required(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Verbose mode. Outputs DEBUG and higher log messages."),
        )
        .subcommand(
            Command::new("weather")
                .about("Fetch and log the current weather.")
                .arg(
                    Arg::new("weather-url")
                        .short('u')
                        .long("weather-url")
                        .env(https_lambdas::WEATHER_URL_VAR)
                        .default_value(weather::DEFAULT_WEATHER_URL)
                        .help("Base URL of the weather API."),
                ),
        )
        .subcommand(
            Command::new("login")
                .about("Read credentials from S3 and post them to the login endpoint.")
                .arg(
                    Arg::new("bucket")
                        .short('b')
                        .long("bucket")
                        .env(https_lambdas::BUCKET_VAR)
                        .default_value(login::DEFAULT_BUCKET)
                        .help("S3 bucket holding the credentials object."),
                )
                .arg(
                    Arg::new("key")
                        .short('k')
                        .long("key")
                        .env(https_lambdas::KEY_VAR)
                        .default_value(login::DEFAULT_KEY)
                        .help("S3 key of the credentials object."),
                )
                .arg(
                    Arg::new("login-url")
                        .short('u')
                        .long("login-url")
                        .env(https_lambdas::LOGIN_URL_VAR)
                        .default_value(login::DEFAULT_LOGIN_URL)
                        .help("Base URL of the login endpoint."),
                )
                .arg(
                    Arg::new("accept-invalid-certs")
                        .long("accept-invalid-certs")
                        .env(https_lambdas::ACCEPT_INVALID_CERTS_VAR)
                        .action(ArgAction::SetTrue)
                        .value_parser(BoolishValueParser::new())
                        .help("Skip TLS certificate verification on the login call. Not for production."),
                ),
        )
}

fn string_arg(matches: &ArgMatches, id: &str) -> Result<String> {
    match matches.get_one::<String>(id) {
        Some(value) => Ok(value.clone()),
        None => bail!("missing {}", id),
    }
}

fn parse_args(matches: ArgMatches) -> Result<Args> {
    let verbose = matches.get_flag("verbose");

    let handler = match matches.subcommand() {
        Some(("weather", sub)) => Handler::Weather(WeatherConfig {
            base_url: string_arg(sub, "weather-url")?,
        }),
        Some(("login", sub)) => Handler::Login(LoginConfig {
            bucket: string_arg(sub, "bucket")?,
            key: string_arg(sub, "key")?,
            base_url: string_arg(sub, "login-url")?,
            accept_invalid_certs: sub.get_flag("accept-invalid-certs"),
        }),
        Some((other, _)) => bail!("unknown handler {}", other),
        None => bail!("no handler given"),
    };

    Ok(Args { verbose, handler })
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(command().get_matches())?;
    https_lambdas::set_up_logger(module_path!(), args.verbose)?;
    debug!("{:?}", args);

    match args.handler {
        Handler::Weather(config) => weather::fetch_current_weather(&config).await?,
        Handler::Login(config) => login::log_in(&config).await?,
    };

    Ok(())
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_command() {
        command().debug_assert();
    }

    #[test]
    fn test_parse_weather() -> Result<()> {
        let args = parse_args(command().try_get_matches_from([
            "main",
            "-v",
            "weather",
            "--weather-url",
            "http://localhost:8080",
        ])?)?;

        assert!(args.verbose);
        match args.handler {
            Handler::Weather(config) => assert_eq!("http://localhost:8080", config.base_url),
            other => panic!("unexpected {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_parse_login() -> Result<()> {
        let args = parse_args(command().try_get_matches_from([
            "main",
            "login",
            "--bucket",
            "creds",
            "--key",
            "team/login.txt",
            "--accept-invalid-certs",
        ])?)?;

        assert!(!args.verbose);
        match args.handler {
            Handler::Login(config) => {
                assert_eq!("creds", config.bucket);
                assert_eq!("team/login.txt", config.key);
                assert!(config.accept_invalid_certs);
            }
            other => panic!("unexpected {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_subcommand_required() {
        assert!(command().try_get_matches_from(["main"]).is_err());
    }
}
