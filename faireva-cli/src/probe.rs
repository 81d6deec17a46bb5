//! Readiness gate for the evaluation service.
//!
//! A bounded number of TCP connection attempts with a fixed pause between failures.
//! Only reachability is checked; no request is sent.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use tracing::{debug, error};

use crate::{
    config::Settings,
    error::{CliError, CliResult},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            delay: Duration::from_secs(5),
        }
    }
}

impl From<&Settings> for RetryPolicy {
    fn from(settings: &Settings) -> Self {
        Self {
            max_attempts: settings.probe_attempts,
            delay: settings.probe_delay,
        }
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connector: Send + Sync {
    /// Whether a TCP connection to `host:port` can be opened.
    async fn connect(&self, host: &str, port: u16) -> bool;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TcpConnector {
    timeout: Duration,
}

impl TcpConnector {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

#[async_trait]
impl Connector for TcpConnector {
    async fn connect(&self, host: &str, port: u16) -> bool {
        match tokio::time::timeout(self.timeout, TcpStream::connect((host, port))).await {
            Ok(Ok(_)) => true,
            Ok(Err(e)) => {
                debug!("Connection to {}:{} failed: {}", host, port, e);
                false
            }
            Err(_) => {
                debug!("Connection to {}:{} timed out", host, port);
                false
            }
        }
    }
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

pub struct ReadinessProbe<C, S> {
    connector: C,
    sleeper: S,
    policy: RetryPolicy,
}

impl ReadinessProbe<TcpConnector, TokioSleeper> {
    pub fn tcp(policy: RetryPolicy, connect_timeout: Duration) -> Self {
        Self::new(TcpConnector::new(connect_timeout), TokioSleeper, policy)
    }
}

impl<C: Connector, S: Sleeper> ReadinessProbe<C, S> {
    pub fn new(connector: C, sleeper: S, policy: RetryPolicy) -> Self {
        Self {
            connector,
            sleeper,
            policy,
        }
    }

    /// Returns the attempt number that succeeded.
    pub async fn wait_until_ready(&self, host: &str, port: u16) -> CliResult<u32> {
        for attempt in 1..=self.policy.max_attempts {
            if self.connector.connect(host, port).await {
                debug!("FAIR-eva API running on {}:{}", host, port);
                return Ok(attempt);
            }
            debug!("FAIR-eva API not running: {}:{} not open", host, port);
            if attempt < self.policy.max_attempts {
                debug!("Sleeping for {:?}..", self.policy.delay);
                self.sleeper.sleep(self.policy.delay).await;
            }
        }

        error!("FAIR-eva API was not able to launch: exiting");
        Err(CliError::ServiceUnavailable {
            host: host.to_string(),
            port,
            attempts: self.policy.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::predicate::eq;

    fn connector_ready_on(attempt: u32) -> MockConnector {
        let mut connector = MockConnector::new();
        let mut calls = 0;
        connector
            .expect_connect()
            .times(attempt.min(4) as usize)
            .returning(move |_, _| {
                calls += 1;
                calls >= attempt
            });
        connector
    }

    fn sleeper(times: usize) -> MockSleeper {
        let mut sleeper = MockSleeper::new();
        sleeper
            .expect_sleep()
            .with(eq(Duration::from_secs(5)))
            .times(times)
            .returning(|_| ());
        sleeper
    }

    #[tokio::test]
    async fn test_ready_after_exactly_k_attempts() {
        for k in 1..=4u32 {
            let probe = ReadinessProbe::new(
                connector_ready_on(k),
                sleeper((k - 1) as usize),
                RetryPolicy::default(),
            );
            let attempts = probe.wait_until_ready("localhost", 9090).await.unwrap();
            assert_eq!(attempts, k);
        }
    }

    #[tokio::test]
    async fn test_unavailable_after_max_attempts() {
        let probe = ReadinessProbe::new(
            connector_ready_on(u32::MAX),
            sleeper(3),
            RetryPolicy::default(),
        );
        let err = probe.wait_until_ready("localhost", 9090).await.unwrap_err();
        assert!(matches!(
            err,
            CliError::ServiceUnavailable { attempts: 4, port: 9090, .. }
        ));
    }

    #[tokio::test]
    async fn test_tcp_probe_against_local_listener() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let policy = RetryPolicy {
            max_attempts: 1,
            delay: Duration::ZERO,
        };

        let probe = ReadinessProbe::tcp(policy, Duration::from_secs(1));
        assert_eq!(probe.wait_until_ready("127.0.0.1", port).await.unwrap(), 1);

        drop(listener);
        let probe = ReadinessProbe::tcp(
            RetryPolicy {
                max_attempts: 2,
                ..policy
            },
            Duration::from_secs(1),
        );
        assert!(probe.wait_until_ready("127.0.0.1", port).await.is_err());
    }
}
