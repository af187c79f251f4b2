use voip::descriptor::{build, negotiated_codec};
use voip::{CandidateKind, CodecAnnouncement, TransportCandidate};

#[test]
fn test_host_candidate_scenario() {
    let candidate = TransportCandidate::new(CandidateKind::Host, "203.0.113.5:40000".parse().unwrap());
    let text = build(&candidate, &CodecAnnouncement::default_set()).unwrap();

    let lines: Vec<&str> = text.split("\r\n").collect();
    assert!(lines.contains(&"c=IN IP4 203.0.113.5"));
    assert!(lines.contains(&"m=audio 40000 RTP/AVP 0 96"));
    assert!(lines.contains(&"a=rtpmap:96 opus/8000/1"));
    assert!(text.ends_with("\r\n"));
}

#[test]
fn test_build_is_deterministic() {
    let candidate = TransportCandidate::server_reflexive("198.51.100.1:5004".parse().unwrap());
    let codecs = CodecAnnouncement::default_set();

    let first = build(&candidate, &codecs).unwrap();
    let second = build(&candidate, &codecs).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_built_description_negotiates_first_codec() {
    let candidate = TransportCandidate::relay("192.0.2.9:3000".parse().unwrap());
    let text = build(&candidate, &[CodecAnnouncement::opus(), CodecAnnouncement::pcmu()]).unwrap();
    assert!(text.contains("m=audio 3000 RTP/AVP 96 0\r\n"));
    assert_eq!(negotiated_codec(&text).unwrap(), "opus");
}
