//! [Google Cloud Pub/Sub] [`Notifier`] implementation.
//!
//! [Google Cloud Pub/Sub]: https://cloud.google.com/pubsub/docs/reference/rest

use std::{sync::Arc, time::Duration};

use base64::{engine::general_purpose::STANDARD, Engine as _};
use common::operations::Publish;
use derive_more::{Display, Error as StdError, From};
use secrecy::{ExposeSecret as _, SecretString};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use tracerr::Traced;

use crate::infra::notifier::{self, Message};
#[cfg(doc)]
use crate::infra::Notifier;

/// [`PubSub`] configuration.
#[derive(Debug, SmartDefault)]
pub struct Config {
    /// Base URL of the Pub/Sub REST API.
    #[default("https://pubsub.googleapis.com".to_owned())]
    pub endpoint: String,

    /// Full name of the topic to publish into, in the
    /// `projects/{project}/topics/{topic}` format.
    pub topic: String,

    /// OAuth 2.0 access token to authorize requests with, if any.
    pub token: Option<SecretString>,

    /// Timeout of a single publish request.
    #[default(Duration::from_secs(10))]
    pub timeout: Duration,
}

/// [`Notifier`] publishing [`Message`]s into a Pub/Sub topic.
#[derive(Clone, Debug)]
pub struct PubSub {
    /// HTTP client performing requests.
    client: reqwest::Client,

    /// URL of the `publish` method of the topic.
    url: String,

    /// OAuth 2.0 access token to authorize requests with, if any.
    token: Option<Arc<SecretString>>,
}

impl PubSub {
    /// Creates a new [`PubSub`] [`Notifier`] with the provided [`Config`].
    ///
    /// # Errors
    ///
    /// If the topic is not configured, or failed to build an HTTP client.
    pub fn new(conf: Config) -> Result<Self, Traced<notifier::Error>> {
        let Config {
            endpoint,
            topic,
            token,
            timeout,
        } = conf;

        if topic.is_empty() {
            return Err(tracerr::new!(Error::NoTopic))
                .map_err(tracerr::map_from);
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;

        Ok(Self {
            client,
            url: format!(
                "{}/v1/{}:publish",
                endpoint.trim_end_matches('/'),
                topic.trim_start_matches('/'),
            ),
            token: token.map(Arc::new),
        })
    }

    /// Returns URL this [`PubSub`] publishes [`Message`]s to.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }
}

/// Body of a `publish` request.
#[derive(Debug, Serialize)]
struct PublishRequest {
    /// Messages to publish.
    messages: [PubsubMessage; 1],
}

/// Message in a `publish` request.
#[derive(Debug, Serialize)]
struct PubsubMessage {
    /// Base64-encoded payload.
    data: String,
}

/// Body of a `publish` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishResponse {
    /// IDs of the published messages.
    #[serde(default)]
    message_ids: Vec<String>,
}

impl notifier::Notifier<Publish<Message>> for PubSub {
    type Ok = ();
    type Err = Traced<notifier::Error>;

    async fn execute(
        &self,
        Publish(msg): Publish<Message>,
    ) -> Result<Self::Ok, Self::Err> {
        let body = PublishRequest {
            messages: [PubsubMessage {
                data: STANDARD.encode(msg.as_ref()),
            }],
        };

        let mut req = self.client.post(&self.url).json(&body);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token.expose_secret());
        }

        let resp = req
            .send()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        let status = resp.status();
        if !status.is_success() {
            return Err(tracerr::new!(Error::Status(status)))
                .map_err(tracerr::map_from);
        }

        let PublishResponse { message_ids } = resp
            .json()
            .await
            .map_err(tracerr::from_and_wrap!(=> Error))
            .map_err(tracerr::map_from)?;
        if message_ids.is_empty() {
            return Err(tracerr::new!(Error::NotAcknowledged))
                .map_err(tracerr::map_from);
        }

        Ok(())
    }
}

/// [`PubSub`] error.
#[derive(Debug, Display, From, StdError)]
pub enum Error {
    /// HTTP request failed.
    #[display("Pub/Sub request failed: {_0}")]
    #[from]
    Request(reqwest::Error),

    /// Pub/Sub responded with non-successful status.
    #[display("Pub/Sub responded with `{_0}` status")]
    Status(#[error(not(source))] reqwest::StatusCode),

    /// Pub/Sub acknowledged no published messages.
    #[display("Pub/Sub acknowledged no messages")]
    NotAcknowledged,

    /// Pub/Sub topic is not configured.
    #[display("Pub/Sub topic is not configured")]
    NoTopic,
}

#[cfg(test)]
mod spec {
    use common::operations::Publish;

    use crate::infra::{notifier, Notifier as _};

    use super::{Config, Error, PubSub};

    #[test]
    fn builds_publish_url() {
        let pubsub = PubSub::new(Config {
            endpoint: "http://localhost:8085/".to_owned(),
            topic: "projects/users/topics/changes".to_owned(),
            ..Config::default()
        })
        .unwrap();

        assert_eq!(
            pubsub.url(),
            "http://localhost:8085/v1/projects/users/topics/changes:publish",
        );
    }

    #[test]
    fn requires_topic() {
        let err = PubSub::new(Config::default()).unwrap_err();

        assert!(matches!(
            err.as_ref(),
            notifier::Error::PubSub(Error::NoTopic),
        ));
    }

    #[tokio::test]
    async fn fails_when_unreachable() {
        let pubsub = PubSub::new(Config {
            endpoint: "http://127.0.0.1:1".to_owned(),
            topic: "projects/users/topics/changes".to_owned(),
            ..Config::default()
        })
        .unwrap();

        let err = pubsub
            .execute(Publish("User has been deleted: 42".into()))
            .await
            .unwrap_err();

        assert!(matches!(
            err.as_ref(),
            notifier::Error::PubSub(Error::Request(_)),
        ));
    }
}
