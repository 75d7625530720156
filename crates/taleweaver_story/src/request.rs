//! Request helpers shared by the generation stages.

use taleweaver_config::GenerationConfig;
use taleweaver_core::{GenerateRequest, GenerateResponse, Message, Modality};
use taleweaver_error::TaleweaverResult;
use taleweaver_interface::{Streaming, collect_stream};

/// Request with the configured creative sampling settings.
pub(crate) fn creative_request(
    config: &GenerationConfig,
    messages: Vec<Message>,
    modalities: Vec<Modality>,
) -> GenerateRequest {
    GenerateRequest {
        messages,
        temperature: Some(config.temperature),
        top_p: Some(config.top_p),
        top_k: Some(config.top_k),
        max_tokens: Some(config.max_output_tokens),
        modalities,
        ..Default::default()
    }
}

/// Send `req`, streaming when asked, and return the whole response.
pub(crate) async fn send<D: Streaming>(
    driver: &D,
    req: &GenerateRequest,
    stream: bool,
) -> TaleweaverResult<GenerateResponse> {
    if stream {
        collect_stream(driver.generate_stream(req).await?).await
    } else {
        driver.generate(req).await
    }
}
