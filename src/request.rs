use reqwest::RequestBuilder;

/// Body of an outgoing request.
#[derive(Debug, Clone)]
pub enum RequestType {
    /// A plain request with no body.
    Plain,

    /// Raw request body with non-json content, sent as `text/plain`.
    Raw(String),

    /// A JSON request with a JSON body and the content type set to application/json.
    JSON { body: String },
}

impl RequestType {
    /// Serializes `value` into a JSON request body.
    pub fn json<T: serde::Serialize + ?Sized>(value: &T) -> Result<Self, serde_json::Error> {
        Ok(RequestType::JSON {
            body: serde_json::to_string(value)?,
        })
    }

    /// Convert the request type to a request builder.
    ///
    /// # Arguments
    /// * `self` - The request type.
    /// * `request` - The request builder.
    ///
    /// # Returns
    /// The request builder with body and content type applied.
    pub fn to_request(self, request: RequestBuilder) -> RequestBuilder {
        match self {
            RequestType::Plain => request,
            RequestType::Raw(body) => request.header("Content-Type", "text/plain").body(body),
            RequestType::JSON { body } => request
                .header("Content-Type", "application/json")
                .body(body),
        }
    }
}

#[cfg(test)]
mod tests {
    use reqwest::Client;
    use serde::Serialize;

    use super::*;

    /// Test converting a plain request type to a request builder.
    #[test]
    fn test_request_type_to_request_plain() {
        // Arrange
        let request = RequestType::Plain
            .to_request(Client::new().request(reqwest::Method::GET, "http://localhost"));

        // Act
        let request = request.build().expect("Could not build request");

        // Assert
        assert_eq!(request.url().as_str(), "http://localhost/");
        assert_eq!(request.method(), reqwest::Method::GET);
        assert!(request.body().is_none());
    }

    /// Test converting a JSON request type to a request builder.
    #[test]
    fn test_request_type_to_request_json() {
        // Arrange
        let request = RequestType::JSON {
            body: "{}".to_string(),
        }
        .to_request(Client::new().request(reqwest::Method::POST, "http://localhost"));

        // Act
        let request = request.build().expect("Could not build request");

        // Assert
        assert_eq!(request.method(), reqwest::Method::POST);
        assert_eq!(
            request
                .body()
                .expect("Could not get body")
                .as_bytes()
                .expect("Could not get bytes"),
            "{}".as_bytes()
        );
        assert_eq!(
            request.headers().get("Content-Type").unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_json_helper_serializes_body() {
        #[derive(Serialize)]
        struct Fruit {
            name: &'static str,
            color: &'static str,
        }

        let context = RequestType::json(&Fruit {
            name: "Banana",
            color: "Yellow",
        })
        .unwrap();

        match context {
            RequestType::JSON { body } => {
                assert_eq!(body, r#"{"name":"Banana","color":"Yellow"}"#)
            }
            other => panic!("Expected a JSON body, got {other:?}"),
        }
    }

    #[test]
    fn test_request_type_to_request_raw() {
        let request = RequestType::Raw("hello".to_string())
            .to_request(Client::new().request(reqwest::Method::PUT, "http://localhost"))
            .build()
            .expect("Could not build request");

        assert_eq!(request.headers().get("Content-Type").unwrap(), "text/plain");
        assert_eq!(request.body().unwrap().as_bytes().unwrap(), b"hello");
    }
}
