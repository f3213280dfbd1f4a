use crate::core::error::{ProviderError, Result};
use crate::core::protocol::{SseEvent, SseParser};
use crate::core::traits::HydraNetwork;
use crate::core::types::{FormPart, FormValue, HydraRequest, HydraResponse, RequestBody};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::multipart::{Form, Part};
use reqwest::Client;
use std::collections::BTreeMap;
use url::Url;

/// Build a reqwest multipart form from the encoded parts.
fn build_form(parts: &[FormPart]) -> Result<Form> {
    let mut form = Form::new();
    for part in parts {
        form = match &part.value {
            FormValue::Text(text) => form.text(part.name.clone(), text.clone()),
            FormValue::File(file) => {
                let mut file_part = Part::bytes(file.bytes.to_vec()).file_name(file.name.clone());
                if let Some(mime) = &file.mime {
                    file_part = file_part
                        .mime_str(mime)
                        .map_err(|e| ProviderError::Transport(e.to_string()))?;
                }
                form.part(part.name.clone(), file_part)
            }
        };
    }
    Ok(form)
}

fn response_headers(headers: &reqwest::header::HeaderMap) -> BTreeMap<String, String> {
    let mut out = BTreeMap::new();
    for (k, v) in headers {
        if let Ok(val) = v.to_str() {
            out.entry(k.as_str().to_string())
                .and_modify(|existing: &mut String| {
                    existing.push_str(", ");
                    existing.push_str(val);
                })
                .or_insert_with(|| val.to_string());
        }
    }
    out
}

/// reqwest-backed network.
pub struct NativeNetwork {
    client: Client,
}

impl NativeNetwork {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }
}

#[async_trait]
impl HydraNetwork for NativeNetwork {
    async fn fetch(&self, request: HydraRequest) -> Result<HydraResponse> {
        let mut req_builder = self.client.request(request.method.clone(), request.url.clone());

        for (k, v) in &request.headers {
            req_builder = req_builder.header(k, v);
        }

        req_builder = match &request.body {
            RequestBody::Empty => req_builder,
            RequestBody::Json(json) => req_builder.body(json.clone()),
            RequestBody::Multipart(parts) => req_builder.multipart(build_form(parts)?),
        };

        let response = req_builder
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response_headers(response.headers());

        let body = response
            .bytes()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        Ok(HydraResponse {
            status,
            headers,
            body,
        })
    }

    async fn subscribe(
        &self,
        url: &Url,
        headers: &BTreeMap<String, String>,
    ) -> Result<async_channel::Receiver<Result<SseEvent>>> {
        let mut req_builder = self.client.get(url.clone());
        for (k, v) in headers {
            req_builder = req_builder.header(k, v);
        }

        let response = req_builder
            .send()
            .await
            .map_err(|e| ProviderError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(ProviderError::Realtime(format!(
                "hub answered {} for {}",
                response.status(),
                url
            )));
        }

        let (tx, rx) = async_channel::bounded(100);
        let mut stream = response.bytes_stream();

        tokio::spawn(async move {
            let mut parser = SseParser::new();
            while let Some(chunk_res) = stream.next().await {
                let events = match chunk_res {
                    Ok(chunk) => parser.feed(&chunk),
                    Err(e) => Err(ProviderError::Transport(e.to_string())),
                };
                match events {
                    Ok(events) => {
                        for event in events {
                            if tx.send(Ok(event)).await.is_err() {
                                return;
                            }
                        }
                    }
                    Err(e) => {
                        let _ = tx.send(Err(e)).await;
                        break;
                    }
                }
            }
        });

        Ok(rx)
    }
}
