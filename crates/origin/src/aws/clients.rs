//! AWS SDK client bundle.

use aws_config::BehaviorVersion;

/// Bundle of AWS SDK clients used by the origin.
///
/// Both clients share the same underlying [`aws_config::SdkConfig`] so that
/// credentials are resolved once and reused.
#[derive(Clone, Debug)]
pub struct AwsClients {
    /// Secrets Manager client used to fetch TLS material at startup.
    pub secretsmanager: aws_sdk_secretsmanager::Client,
    /// S3 client used to read the assets being served.
    pub s3: aws_sdk_s3::Client,
}

impl AwsClients {
    /// Initialise all AWS SDK clients.
    ///
    /// When `endpoint_url` is set, both services are pointed at it and S3 uses
    /// path-style addressing, which local emulators expect.
    pub async fn init(endpoint_url: Option<&str>) -> Self {
        let config = aws_config::defaults(BehaviorVersion::latest()).load().await;

        let mut sm = aws_sdk_secretsmanager::config::Builder::from(&config);
        let mut s3 = aws_sdk_s3::config::Builder::from(&config);
        if let Some(url) = endpoint_url {
            sm = sm.endpoint_url(url);
            s3 = s3.endpoint_url(url).force_path_style(true);
        }

        Self {
            secretsmanager: aws_sdk_secretsmanager::Client::from_conf(sm.build()),
            s3: aws_sdk_s3::Client::from_conf(s3.build()),
        }
    }
}
