//! Caller identity lookups available to the CLI.

use log::info;

use sitestack::identity::{AccountId, IdentityError, IdentityLookup};

/// Resolves the caller account through AWS STS `GetCallerIdentity`.
///
/// Credentials come from the standard AWS provider chain. Nothing is sent
/// until the emitter asks for the account id.
#[cfg(feature = "sts")]
#[derive(Debug, Clone)]
pub struct StsIdentity {
    region: String,
}

#[cfg(feature = "sts")]
impl StsIdentity {
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
        }
    }
}

#[cfg(feature = "sts")]
impl IdentityLookup for StsIdentity {
    fn account_id(&self) -> Result<AccountId, IdentityError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| IdentityError::Lookup(format!("failed to start runtime: {err}")))?;

        let account = runtime.block_on(async {
            let config = aws_config::defaults(aws_config::BehaviorVersion::latest())
                .region(aws_config::Region::new(self.region.clone()))
                .load()
                .await;
            let identity = aws_sdk_sts::Client::new(&config)
                .get_caller_identity()
                .send()
                .await
                .map_err(|err| {
                    IdentityError::Lookup(format!(
                        "failed to get AWS caller identity, check credentials: {err}"
                    ))
                })?;
            identity.account().map(str::to_string).ok_or_else(|| {
                IdentityError::Lookup("no account id returned from STS GetCallerIdentity".into())
            })
        })?;

        info!(account_id = account; "AWS account validated");
        account.parse()
    }
}

/// Fails every lookup; used when no account id source is available.
#[cfg_attr(feature = "sts", allow(dead_code))]
#[derive(Debug, Clone)]
pub struct UnavailableIdentity {
    reason: String,
}

#[cfg_attr(feature = "sts", allow(dead_code))]
impl UnavailableIdentity {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl IdentityLookup for UnavailableIdentity {
    fn account_id(&self) -> Result<AccountId, IdentityError> {
        Err(IdentityError::Lookup(self.reason.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unavailable_identity_fails() {
        let identity = UnavailableIdentity::new("no account id");
        assert_eq!(
            identity.account_id().unwrap_err().to_string(),
            "no account id"
        );
    }
}
