use wireline::http::headers::Headers;
use wireline::http::response::{
    HandlerError, StatusCode, chunked_headers, content_headers, default_headers,
};
use wireline::http::writer::{ResponseError, ResponseWriter, serialize_headers};

fn header_lines(block: &[u8]) -> Vec<String> {
    let text = String::from_utf8(block.to_vec()).unwrap();
    assert!(text.ends_with("\r\n\r\n") || text == "\r\n");
    let mut lines: Vec<String> = text
        .trim_end_matches("\r\n")
        .split("\r\n")
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect();
    lines.sort();
    lines
}

#[test]
fn test_status_code_as_u16() {
    assert_eq!(StatusCode::OK.as_u16(), 200);
    assert_eq!(StatusCode::BAD_REQUEST.as_u16(), 400);
    assert_eq!(StatusCode::INTERNAL_SERVER_ERROR.as_u16(), 500);
    assert_eq!(StatusCode::from(418).as_u16(), 418);
}

#[test]
fn test_status_lines() {
    assert_eq!(StatusCode::OK.status_line(), b"HTTP/1.1 200 OK\r\n");
    assert_eq!(
        StatusCode::BAD_REQUEST.status_line(),
        b"HTTP/1.1 400 Bad Request\r\n"
    );
    assert_eq!(
        StatusCode::INTERNAL_SERVER_ERROR.status_line(),
        b"HTTP/1.1 500 Internal Server Error\r\n"
    );
}

#[test]
fn test_unmapped_status_degrades_to_bare_crlf() {
    assert_eq!(StatusCode(404).status_line(), b"\r\n");
    assert_eq!(StatusCode(404).reason_phrase(), None);
}

#[test]
fn test_default_headers() {
    let headers = default_headers(42);

    assert_eq!(headers.get("Content-Length"), Some("42"));
    assert_eq!(headers.get("Connection"), Some("close"));
    assert_eq!(headers.get("Content-Type"), Some("text/html"));
    assert_eq!(headers.len(), 3);
}

#[test]
fn test_chunked_headers_omit_content_length() {
    let headers = chunked_headers();

    assert_eq!(headers.get("Transfer-Encoding"), Some("chunked"));
    assert!(!headers.contains("Content-Length"));
}

#[test]
fn test_serialize_headers_has_no_space_after_colon() {
    let mut headers = Headers::new();
    headers.set("Connection", "close");
    headers.set("X-Test", "a b");

    let lines = header_lines(&serialize_headers(&headers));
    assert_eq!(lines, vec!["connection:close", "x-test:a b"]);
}

#[test]
fn test_serialize_empty_headers_is_blank_line() {
    assert_eq!(serialize_headers(&Headers::new()), b"\r\n".to_vec());
}

#[test]
fn test_write_body_wraps_payload_in_html() {
    let mut writer = ResponseWriter::new();
    writer.write_status_line(StatusCode::OK);
    let n = writer.write_body(b"All good, frfr").unwrap();

    let expected = "<html>\n  <head>\n    <title>200 OK</title>\n  </head>\n  <body>\n    <h1>OK</h1>\n    <p>All good, frfr</p>\n  </body>\n</html>";
    assert_eq!(writer.body(), expected.as_bytes());
    assert_eq!(n, expected.len());
}

#[test]
fn test_write_body_uses_error_reason_as_heading() {
    let mut writer = ResponseWriter::new();
    writer.write_status_line(StatusCode::INTERNAL_SERVER_ERROR);
    writer.write_body(b"Woopsie, my bad").unwrap();

    let body = String::from_utf8(writer.body().to_vec()).unwrap();
    assert!(body.contains("<title>500 Internal Server Error</title>"));
    assert!(body.contains("<h1>Internal Server Error</h1>"));
    assert!(body.contains("<p>Woopsie, my bad</p>"));
}

#[test]
fn test_write_body_without_status_line_fails() {
    let mut writer = ResponseWriter::new();
    writer.write_status_line(StatusCode(404));

    assert_eq!(
        writer.write_body(b"missing"),
        Err(ResponseError::MalformedStatusLine)
    );
    assert!(writer.body().is_empty());
}

#[test]
fn test_html_response_has_matching_content_length() {
    let writer = ResponseWriter::html(StatusCode::OK, b"hi");
    let bytes = writer.to_bytes();
    let text = String::from_utf8(bytes).unwrap();

    assert!(text.starts_with("HTTP/1.1 200 OK\r\n"));
    let lines = header_lines(writer.headers());
    assert!(lines.contains(&format!("content-length:{}", writer.body().len())));
    assert!(lines.contains(&"connection:close".to_string()));
    assert!(lines.contains(&"content-type:text/html".to_string()));
    assert!(text.ends_with("</html>"));
}

#[test]
fn test_write_body_keeps_non_utf8_payload() {
    let payload = [0xff, 0x00, 0xfe, b'a'];
    let writer = ResponseWriter::html(StatusCode::OK, &payload);
    let body = writer.body();

    let mut expected = b"<p>".to_vec();
    expected.extend_from_slice(&payload);
    expected.extend_from_slice(b"</p>");
    assert!(body.windows(expected.len()).any(|w| w == expected.as_slice()));
    assert!(body.ends_with(b"</html>"));
    assert!(
        header_lines(writer.headers()).contains(&format!("content-length:{}", body.len()))
    );
}

#[test]
fn test_content_headers_use_given_type() {
    let lines = header_lines(&serialize_headers(&content_headers(3, "video/mp4")));

    assert_eq!(
        lines,
        vec!["connection:close", "content-length:3", "content-type:video/mp4"]
    );
}

#[test]
fn test_raw_response_sends_payload_unwrapped() {
    let payload = [0x00, 0x00, 0x00, 0x18, b'f', b't', b'y', b'p', 0xff];
    let writer = ResponseWriter::raw(StatusCode::OK, &payload, "video/mp4");

    assert_eq!(writer.status_line(), b"HTTP/1.1 200 OK\r\n");
    assert_eq!(writer.body(), payload);
    let lines = header_lines(writer.headers());
    assert!(lines.contains(&format!("content-length:{}", payload.len())));
    assert!(lines.contains(&"content-type:video/mp4".to_string()));
}

#[test]
fn test_handler_error_response() {
    let err = HandlerError::bad_request("Your problem is not my problem");
    let writer = ResponseWriter::from_handler_error(&err);

    assert_eq!(writer.status_line(), b"HTTP/1.1 400 Bad Request\r\n");
    let body = String::from_utf8(writer.body().to_vec()).unwrap();
    assert!(body.contains("<p>Your problem is not my problem</p>"));
}

#[test]
fn test_handler_error_with_unmapped_status_sends_empty_body() {
    let err = HandlerError::new(404u16, "nope");
    let writer = ResponseWriter::from_handler_error(&err);

    assert_eq!(writer.status_line(), b"\r\n");
    assert!(writer.body().is_empty());
    assert!(header_lines(writer.headers()).contains(&"content-length:0".to_string()));
}

#[test]
fn test_io_error_becomes_internal_error() {
    let err: HandlerError =
        std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone").into();

    assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(err.message, b"gone".to_vec());
}

#[tokio::test]
async fn test_write_to_stream_writes_all_parts() {
    let writer = ResponseWriter::html(StatusCode::OK, b"payload");
    let mut out: Vec<u8> = Vec::new();

    writer.write_to_stream(&mut out).await.unwrap();

    assert_eq!(out, writer.to_bytes());
    assert!(out.starts_with(writer.status_line()));
    assert!(out.ends_with(writer.body()));
}
