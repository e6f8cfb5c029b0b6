use serde_json::Value;
use url::Url;

use super::{DOWNLOAD_PATH, STREAM_DESCRIPTOR_PATH};
use crate::core::filename::save_name;
use crate::error::{PipelineError, PipelineResult};
use crate::models::recording::{ResolvedDownload, StreamParameters};

const STREAM_OPTION_KEY: &str = "mp4StreamOption";

fn string_field(obj: &Value, key: &str, path: &str) -> PipelineResult<String> {
    match obj.get(key) {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(PipelineError::MetadataShape(format!("{}{}", path, key))),
    }
}

/// Projects the raw metadata response onto [`StreamParameters`].
pub fn extract_stream_parameters(response: &Value) -> PipelineResult<StreamParameters> {
    let option = response
        .get(STREAM_OPTION_KEY)
        .filter(|v| v.is_object())
        .ok_or_else(|| PipelineError::MetadataShape(STREAM_OPTION_KEY.to_string()))?;

    let prefix = format!("{}.", STREAM_OPTION_KEY);
    let field = |key: &str| string_field(option, key, &prefix);

    Ok(StreamParameters {
        host: field("host")?,
        recording_dir: field("recordingDir")?,
        timestamp: field("timestamp")?,
        token: field("token")?,
        xml_name: field("xmlName")?,
        playback_option: field("playbackOption")?,
        record_name: string_field(response, "recordName", "")?,
    })
}

fn endpoint(params: &StreamParameters, path: &str) -> PipelineResult<Url> {
    let mut url = Url::parse(&params.host)?.join(path)?;
    url.query_pairs_mut()
        .append_pair("recordingDir", &params.recording_dir)
        .append_pair("timestamp", &params.timestamp)
        .append_pair("token", &params.token);
    Ok(url)
}

pub fn compose_stream_url(params: &StreamParameters) -> PipelineResult<Url> {
    let mut url = endpoint(params, STREAM_DESCRIPTOR_PATH)?;
    url.query_pairs_mut()
        .append_pair("xmlName", &params.xml_name)
        .append_pair("isMobileOrTablet", "false")
        .append_pair("ext", &params.playback_option);
    Ok(url)
}

pub fn compose_download_url(params: &StreamParameters, filename: &str) -> PipelineResult<Url> {
    let mut url = endpoint(params, DOWNLOAD_PATH)?;
    url.query_pairs_mut().append_pair("fileName", filename);
    Ok(url)
}

pub fn resolve_download(params: &StreamParameters, filename: &str) -> PipelineResult<ResolvedDownload> {
    Ok(ResolvedDownload {
        download_url: compose_download_url(params, filename)?.to_string(),
        savename: save_name(&params.record_name),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashSet;

    fn sample_response() -> Value {
        json!({
            "mp4StreamOption": {
                "host": "https://acme.webex.com/",
                "recordingDir": "d1",
                "timestamp": "t1",
                "token": "tok",
                "xmlName": "x.xml",
                "playbackOption": "mp4"
            },
            "recordName": "Team Sync"
        })
    }

    fn query_set(url: &Url) -> HashSet<(String, String)> {
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }

    #[test]
    fn extracts_all_fields() {
        let params = extract_stream_parameters(&sample_response()).unwrap();
        assert_eq!(params.host, "https://acme.webex.com/");
        assert_eq!(params.recording_dir, "d1");
        assert_eq!(params.timestamp, "t1");
        assert_eq!(params.token, "tok");
        assert_eq!(params.xml_name, "x.xml");
        assert_eq!(params.playback_option, "mp4");
        assert_eq!(params.record_name, "Team Sync");
    }

    #[test]
    fn numeric_fields_are_stringified() {
        let mut response = sample_response();
        response["mp4StreamOption"]["timestamp"] = json!(1700000000123_u64);
        let params = extract_stream_parameters(&response).unwrap();
        assert_eq!(params.timestamp, "1700000000123");
    }

    #[test]
    fn missing_stream_option_fails() {
        let err = extract_stream_parameters(&json!({ "code": 403, "message": "no permission" }))
            .unwrap_err();
        match err {
            PipelineError::MetadataShape(field) => assert_eq!(field, "mp4StreamOption"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn missing_nested_field_names_the_path() {
        let mut response = sample_response();
        response["mp4StreamOption"].as_object_mut().unwrap().remove("token");
        let err = extract_stream_parameters(&response).unwrap_err();
        assert!(matches!(err, PipelineError::MetadataShape(ref f) if f == "mp4StreamOption.token"));
    }

    #[test]
    fn missing_record_name_fails() {
        let mut response = sample_response();
        response.as_object_mut().unwrap().remove("recordName");
        assert!(matches!(
            extract_stream_parameters(&response),
            Err(PipelineError::MetadataShape(ref f)) if f == "recordName"
        ));
    }

    #[test]
    fn stream_url_has_exact_query() {
        let params = extract_stream_parameters(&sample_response()).unwrap();
        let url = compose_stream_url(&params).unwrap();
        assert_eq!(
            url.as_str(),
            "https://acme.webex.com/apis/html5-pipeline.do?recordingDir=d1&timestamp=t1&token=tok&xmlName=x.xml&isMobileOrTablet=false&ext=mp4"
        );
    }

    #[test]
    fn download_url_has_filename() {
        let params = extract_stream_parameters(&sample_response()).unwrap();
        let url = compose_download_url(&params, "video123.mp4").unwrap();
        assert_eq!(url.path(), "/apis/download.do");
        let expected: HashSet<(String, String)> = [
            ("recordingDir", "d1"),
            ("timestamp", "t1"),
            ("token", "tok"),
            ("fileName", "video123.mp4"),
        ]
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
        assert_eq!(query_set(&url), expected);
    }

    #[test]
    fn resolve_download_sanitizes_record_name() {
        let params = extract_stream_parameters(&sample_response()).unwrap();
        let resolved = resolve_download(&params, "video123.mp4").unwrap();
        assert_eq!(resolved.savename, "Team_Sync.mp4");
        assert!(resolved.download_url.contains("fileName=video123.mp4"));
    }

    #[test]
    fn composition_is_deterministic() {
        let params = extract_stream_parameters(&sample_response()).unwrap();
        let a = compose_stream_url(&params).unwrap();
        let b = compose_stream_url(&params).unwrap();
        assert_eq!(query_set(&a), query_set(&b));
    }

    #[test]
    fn values_are_query_encoded() {
        let mut params = extract_stream_parameters(&sample_response()).unwrap();
        params.token = "a+b/c=&d".into();
        let url = compose_download_url(&params, "my file.mp4").unwrap();
        let pairs = query_set(&url);
        assert!(pairs.contains(&("token".to_string(), "a+b/c=&d".to_string())));
        assert!(pairs.contains(&("fileName".to_string(), "my file.mp4".to_string())));
    }

    #[test]
    fn host_without_trailing_slash() {
        let mut params = extract_stream_parameters(&sample_response()).unwrap();
        params.host = "https://nfs.webex.com".into();
        let url = compose_stream_url(&params).unwrap();
        assert!(url.as_str().starts_with("https://nfs.webex.com/apis/html5-pipeline.do?"));
    }

    #[test]
    fn invalid_host_is_an_error() {
        let mut params = extract_stream_parameters(&sample_response()).unwrap();
        params.host = "not a url".into();
        assert!(matches!(compose_stream_url(&params), Err(PipelineError::InvalidUrl(_))));
    }
}
