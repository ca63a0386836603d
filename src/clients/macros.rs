#[macro_export]
/// Make a rate limited GET request expecting JSON.
///
/// 404 and 400 statuses are reported as slot errors, any other non-success status as an API
/// error. If JSON deser fails, emit a `WARN` level tracing event.
macro_rules! json_get {
    ($client:expr, $rate_limiter:expr, $url:expr, $expected:ty) => {{
        let url = $url.clone();

        $rate_limiter.acquire().await;

        tracing::debug!(url = url.as_str(), method = "GET", "Dispatching API request");

        let resp = $client
            .get($url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await?;
        let status = resp.status();

        if let Some(error) = $crate::clients::common::ClientError::from_slot_status(status) {
            tracing::debug!(url = %url, status = status.as_u16(), "Slot rejected by server");

            return Err(error);
        }

        let text = resp.text().await?;

        if !status.is_success() {
            tracing::warn!(
                method = "GET",
                url = %url,
                status = status.as_u16(),
                response = text.as_str(),
                "Unexpected response status from server"
            );

            return Err($crate::clients::common::ClientError::from_error_status(status, text));
        }

        match serde_json::from_str::<$expected>(&text) {
            Err(e) => {
                tracing::warn!(
                    method = "GET",
                    url = %url,
                    response = text.as_str(),
                    "Unexpected response from server"
                );

                Err($crate::clients::common::ClientError::from(e))
            }
            Ok(response) => Ok(response),
        }
    }};
}
