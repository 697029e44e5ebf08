use axum::http::{HeaderMap, Method, Uri};

/// Headers covered by the signature, in their canonical casing.
pub const SIGNED_HEADERS: [&str; 9] = [
    "Host",
    "X-Auth-Timestamp",
    "X-Auth-Request-Id",
    "X-Auth-Kid",
    "X-Auth-Email",
    "X-Auth-Name",
    "X-Auth-Picture",
    "X-Auth-Subject",
    "X-Auth-IsServiceAccount",
];

/// `METHOD\nPATH\nQUERY\nHEADERS`, where HEADERS are the present signed
/// headers as sorted `name:v1,v2` lines. The body is not covered.
pub fn canonical_request(method: &Method, uri: &Uri, headers: &HeaderMap) -> String {
    let mut pairs: Vec<String> = SIGNED_HEADERS
        .iter()
        .filter_map(|name| {
            let lower = name.to_ascii_lowercase();
            let mut values: Vec<&str> = headers
                .get_all(lower.as_str())
                .iter()
                .filter_map(|v| v.to_str().ok())
                .collect();
            if values.is_empty() && lower == "host" {
                values.extend(uri.authority().map(|a| a.as_str()));
            }
            (!values.is_empty()).then(|| format!("{lower}:{}", values.join(",")))
        })
        .collect();
    pairs.sort();
    let signed = pairs.join("\n");

    [
        method.as_str(),
        uri.path(),
        uri.query().unwrap_or(""),
        signed.as_str(),
    ]
    .join("\n")
}
