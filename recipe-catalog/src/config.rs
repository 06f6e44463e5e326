//! Command line and environment configuration for the server.

use clap::Parser;
use snafu::Snafu;
use url::Url;

/// Errors in the server configuration.
#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("cannot set credentials on MongoDB URL {url}"))]
    InvalidCredentials { url: Url },
}

/// Options for running the recipe catalog server.
///
/// Every option can also be given through the environment.
#[derive(Clone, Debug, Parser)]
#[clap(name = "recipe-catalog", about = "GraphQL API for a catalog of recipes")]
pub struct Options {
    /// The MongoDB deployment to connect to.
    #[clap(
        long,
        env = "RECIPES_MONGO_URL",
        default_value = "mongodb://localhost:27017"
    )]
    pub mongo_url: Url,

    /// User to authenticate as, if the deployment requires it.
    #[clap(long, env = "RECIPES_MONGO_USER")]
    pub mongo_user: Option<String>,

    /// Password for --mongo-user.
    #[clap(long, env = "RECIPES_MONGO_PASSWORD", hide_env_values = true)]
    pub mongo_password: Option<String>,

    /// The database holding the catalog.
    #[clap(long, env = "RECIPES_DATABASE", default_value = "recipes")]
    pub database: String,

    /// Port for the HTTP server.
    #[clap(short, long, env = "RECIPES_PORT", default_value = "8000")]
    pub port: u16,
}

impl Options {
    /// The connection string for the MongoDB deployment, including any credentials.
    pub fn mongo_uri(&self) -> Result<Url, Error> {
        let mut url = self.mongo_url.clone();
        if let Some(user) = &self.mongo_user {
            url.set_username(user)
                .map_err(|_| Error::InvalidCredentials {
                    url: self.mongo_url.clone(),
                })?;
        }
        if let Some(password) = &self.mongo_password {
            url.set_password(Some(password))
                .map_err(|_| Error::InvalidCredentials {
                    url: self.mongo_url.clone(),
                })?;
        }
        Ok(url)
    }
}

/// A form of `url` which is safe to log.
pub fn redacted(url: &Url) -> Url {
    let mut url = url.clone();
    if url.password().is_some() {
        // Only fails for URLs which can't have a password, and this one already has one.
        let _ = url.set_password(Some("****"));
    }
    url
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_defaults() {
        let opt = Options::try_parse_from(["recipe-catalog"]).unwrap();
        assert_eq!(opt.database, "recipes");
        assert_eq!(opt.port, 8000);
        assert_eq!(
            opt.mongo_uri().unwrap().as_str(),
            "mongodb://localhost:27017"
        );
    }

    #[test]
    fn test_credentials() {
        let opt = Options::try_parse_from([
            "recipe-catalog",
            "--mongo-url",
            "mongodb://db.greendale.edu:27017",
            "--mongo-user",
            "dean",
            "--mongo-password",
            "p@ss word",
            "--port",
            "4000",
        ])
        .unwrap();
        assert_eq!(opt.port, 4000);

        let uri = opt.mongo_uri().unwrap();
        assert_eq!(uri.username(), "dean");
        assert_eq!(uri.password(), Some("p%40ss%20word"));
        assert_eq!(uri.host_str(), Some("db.greendale.edu"));

        let safe = redacted(&uri).to_string();
        assert!(!safe.contains("p%40ss"), "{safe}");
        assert!(safe.contains("dean:****@"), "{safe}");
    }

    #[test]
    fn test_invalid_url() {
        assert!(Options::try_parse_from(["recipe-catalog", "--mongo-url", "not a url"]).is_err());
    }
}
