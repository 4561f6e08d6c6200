use async_trait::async_trait;
use aws_sdk_sesv2::Client;
use aws_sdk_sesv2::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_sesv2::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_sesv2::types::{Body, Content, Destination, EmailContent, Message};
use esp_core::{Email, EmailProvider, EspError, FromProviderConfig, ProviderConfig, SendReceipt, mock};

pub const KIND: &str = "ses";
const CREDENTIALS_PROVIDER: &str = "esp-connector";
const CHARSET: &str = "UTF-8";

const CREDENTIAL_ERRORS: [&str; 5] = [
    "InvalidClientTokenId",
    "SignatureDoesNotMatch",
    "UnrecognizedClientException",
    "IncompleteSignature",
    "AccessDeniedException",
];
const ACTIVATION_ERRORS: [&str; 2] = ["AccountSuspendedException", "SendingPausedException"];

enum Target {
    Mock(String),
    UnknownRegion,
    Live(Client),
}

/// Amazon SES v2 `SendEmail` adapter using static credentials.
pub struct SesProvider {
    name: String,
    target: Target,
}

impl FromProviderConfig for SesProvider {
    fn from_config(config: &ProviderConfig) -> Result<Self, EspError> {
        let access_key_id = config.require_str("accessKeyId")?;
        let secret_access_key = config.require_str("secretAccessKey")?;
        let region = config.require_str("region")?;
        let endpoint = config.endpoint()?;

        let target = match endpoint.and_then(mock::scenario) {
            Some(scenario) => Target::Mock(scenario.to_string()),
            None if !is_region_name(region) => Target::UnknownRegion,
            None => {
                let credentials = Credentials::new(
                    access_key_id,
                    secret_access_key,
                    None,
                    None,
                    CREDENTIALS_PROVIDER,
                );
                let mut builder = aws_sdk_sesv2::Config::builder()
                    .behavior_version(BehaviorVersion::latest())
                    .region(Region::new(region.to_string()))
                    .credentials_provider(credentials);
                if let Some(endpoint) = endpoint {
                    builder = builder.endpoint_url(endpoint);
                }
                Target::Live(Client::from_conf(builder.build()))
            }
        };

        Ok(Self {
            name: config.name().to_string(),
            target,
        })
    }
}

/// Matches AWS region names such as `us-east-1` or `us-gov-west-1`.
pub(crate) fn is_region_name(region: &str) -> bool {
    let parts: Vec<&str> = region.split('-').collect();
    let [area, middle @ .., number] = parts.as_slice() else {
        return false;
    };
    area.len() == 2
        && area.bytes().all(|b| b.is_ascii_lowercase())
        && !middle.is_empty()
        && middle
            .iter()
            .all(|part| !part.is_empty() && part.bytes().all(|b| b.is_ascii_lowercase()))
        && !number.is_empty()
        && number.bytes().all(|b| b.is_ascii_digit())
}

fn content(data: &str) -> Result<Content, EspError> {
    Content::builder()
        .data(data)
        .charset(CHARSET)
        .build()
        .map_err(|err| EspError::parameter_invalid("invalid SES message content").with_source(err))
}

fn non_empty(list: &[String]) -> Option<Vec<String>> {
    (!list.is_empty()).then(|| list.to_vec())
}

pub(crate) fn destination(email: &Email) -> Destination {
    Destination::builder()
        .set_to_addresses(non_empty(email.to()))
        .set_cc_addresses(non_empty(email.cc()))
        .set_bcc_addresses(non_empty(email.bcc()))
        .build()
}

pub(crate) fn email_content(email: &Email) -> Result<EmailContent, EspError> {
    let mut body = Body::builder();
    if let Some(text) = email.text().filter(|text| !text.is_empty()) {
        body = body.text(content(text)?);
    }
    if let Some(html) = email.html().filter(|html| !html.is_empty()) {
        body = body.html(content(html)?);
    }
    let message = Message::builder()
        .subject(content(email.subject().unwrap_or_default())?)
        .body(body.build())
        .build();
    Ok(EmailContent::builder().simple(message).build())
}

/// Maps an SES error code onto the connector taxonomy.
pub(crate) fn classify_code(name: &str, code: Option<&str>, message: Option<&str>) -> EspError {
    match code {
        Some(code) if CREDENTIAL_ERRORS.contains(&code) => EspError::configuration_invalid(name),
        Some(code) if ACTIVATION_ERRORS.contains(&code) => EspError::activation_required(name),
        _ => EspError::rejected(
            message
                .or(code)
                .filter(|message| !message.is_empty())
                .unwrap_or("Incorrect Request."),
        ),
    }
}

fn classify<E, R>(name: &str, err: SdkError<E, R>) -> EspError
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
    R: std::fmt::Debug,
{
    let classified = match &err {
        SdkError::ServiceError(service) => {
            let inner = service.err();
            classify_code(name, inner.code(), inner.message())
        }
        _ => EspError::transport(format!("failed to call {KIND} API")),
    };
    classified.with_source(anyhow::anyhow!("{}", DisplayErrorContext(&err)))
}

#[async_trait]
impl EmailProvider for SesProvider {
    fn name(&self) -> &str {
        &self.name
    }

    fn kind(&self) -> &str {
        KIND
    }

    async fn send(&self, email: &Email) -> Result<SendReceipt, EspError> {
        let client = match &self.target {
            Target::Mock(scenario) => return mock::resolve(&self.name, scenario),
            Target::UnknownRegion => return Err(EspError::configuration_invalid(&self.name)),
            Target::Live(client) => client,
        };

        let output = client
            .send_email()
            .from_email_address(email.from())
            .destination(destination(email))
            .content(email_content(email)?)
            .send()
            .await
            .map_err(|err| classify(&self.name, err))?;
        Ok(SendReceipt::new(
            &self.name,
            output.message_id().map(str::to_string),
        ))
    }
}
