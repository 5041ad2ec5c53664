use quick_xml::Reader;
use quick_xml::events::{BytesStart, Event};
use tracing::debug;

use super::utils::{parse_frame_rate, resolve_url, split_codecs};
use crate::common::{ExtractorError, ExtractorResult};
use crate::protocol::{Protocol, StreamFormat};

/// Attributes shared by `AdaptationSet` and `Representation`; a representation
/// inherits whatever it leaves unset from its adaptation set.
#[derive(Debug, Default, Clone)]
struct StreamAttrs {
    id: Option<String>,
    bandwidth: Option<u64>,
    width: Option<u32>,
    height: Option<u32>,
    frame_rate: Option<f64>,
    codecs: Option<String>,
    mime_type: Option<String>,
    content_type: Option<String>,
    base_url: Option<String>,
    protected: bool,
}

impl StreamAttrs {
    fn from_element(e: &BytesStart<'_>) -> Self {
        let mut attrs = Self::default();
        for attr in e.attributes().flatten() {
            let Ok(value) = attr.unescape_value() else {
                continue;
            };
            match attr.key.local_name().as_ref() {
                b"id" => attrs.id = Some(value.to_string()),
                b"bandwidth" => attrs.bandwidth = value.parse().ok(),
                b"width" => attrs.width = value.parse().ok(),
                b"height" => attrs.height = value.parse().ok(),
                b"frameRate" => attrs.frame_rate = parse_frame_rate(&value),
                b"codecs" => attrs.codecs = Some(value.to_string()),
                b"mimeType" => attrs.mime_type = Some(value.to_string()),
                b"contentType" => attrs.content_type = Some(value.to_string()),
                _ => {}
            }
        }
        attrs
    }

    fn inherit(mut self, parent: &StreamAttrs) -> Self {
        self.width = self.width.or(parent.width);
        self.height = self.height.or(parent.height);
        self.frame_rate = self.frame_rate.or(parent.frame_rate);
        self.codecs = self.codecs.or_else(|| parent.codecs.clone());
        self.mime_type = self.mime_type.or_else(|| parent.mime_type.clone());
        self.content_type = self.content_type.or_else(|| parent.content_type.clone());
        self.protected |= parent.protected;
        self
    }

    fn kind(&self) -> &str {
        if let Some(ct) = self.content_type.as_deref() {
            return ct;
        }
        self.mime_type
            .as_deref()
            .and_then(|m| m.split('/').next())
            .unwrap_or("video")
    }
}

#[derive(Default)]
struct AdaptationSet {
    attrs: StreamAttrs,
    representations: Vec<StreamAttrs>,
}

/// Expands an MPD document into one format per clear `Representation`.
///
/// Adaptation sets or representations that carry `ContentProtection` are
/// skipped, as are text tracks.
pub fn parse_mpd(xml: &str, mpd_url: &str) -> ExtractorResult<Vec<StreamFormat>> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut saw_mpd = false;
    let mut in_period = false;
    let mut in_base_url = false;
    let mut mpd_base: Option<String> = None;
    let mut period_base: Option<String> = None;
    let mut adaptation: Option<AdaptationSet> = None;
    let mut representation: Option<StreamAttrs> = None;
    let mut formats = Vec::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"MPD" => saw_mpd = true,
                b"Period" => {
                    in_period = true;
                    period_base = None;
                }
                b"AdaptationSet" => {
                    adaptation = Some(AdaptationSet {
                        attrs: StreamAttrs::from_element(&e),
                        representations: Vec::new(),
                    });
                }
                b"Representation" => representation = Some(StreamAttrs::from_element(&e)),
                b"ContentProtection" => mark_protected(&mut adaptation, &mut representation),
                b"BaseURL" => in_base_url = true,
                _ => {}
            },
            Ok(Event::Empty(e)) => match e.local_name().as_ref() {
                b"Representation" => {
                    if let Some(set) = adaptation.as_mut() {
                        set.representations.push(StreamAttrs::from_element(&e));
                    }
                }
                b"ContentProtection" => mark_protected(&mut adaptation, &mut representation),
                _ => {}
            },
            Ok(Event::Text(t)) if in_base_url => {
                let text = t
                    .unescape()
                    .map_err(|e| ExtractorError::Parse {
                        what: "DASH manifest",
                        reason: e.to_string(),
                    })?
                    .trim()
                    .to_string();
                if let Some(rep) = representation.as_mut() {
                    rep.base_url = Some(text);
                } else if let Some(set) = adaptation.as_mut() {
                    set.attrs.base_url = Some(text);
                } else if in_period {
                    period_base = Some(text);
                } else {
                    mpd_base = Some(text);
                }
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"BaseURL" => in_base_url = false,
                b"Representation" => {
                    if let (Some(rep), Some(set)) = (representation.take(), adaptation.as_mut()) {
                        set.representations.push(rep);
                    }
                }
                b"AdaptationSet" => {
                    if let Some(set) = adaptation.take() {
                        let bases = [mpd_base.as_deref(), period_base.as_deref()];
                        emit_adaptation_set(set, mpd_url, &bases, &mut formats);
                    }
                }
                b"Period" => {
                    in_period = false;
                    period_base = None;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(ExtractorError::Parse {
                    what: "DASH manifest",
                    reason: format!("{} at position {}", e, reader.error_position()),
                });
            }
            _ => {}
        }
    }

    if !saw_mpd {
        return Err(ExtractorError::Parse {
            what: "DASH manifest",
            reason: format!("{} has no MPD element", mpd_url),
        });
    }

    debug!("DASH: {} formats from {}", formats.len(), mpd_url);
    Ok(formats)
}

fn mark_protected(adaptation: &mut Option<AdaptationSet>, representation: &mut Option<StreamAttrs>) {
    if let Some(rep) = representation.as_mut() {
        rep.protected = true;
    } else if let Some(set) = adaptation.as_mut() {
        set.attrs.protected = true;
    }
}

fn emit_adaptation_set(
    set: AdaptationSet,
    mpd_url: &str,
    outer_bases: &[Option<&str>],
    formats: &mut Vec<StreamFormat>,
) {
    if set.attrs.protected {
        debug!("DASH: skipping protected adaptation set in {}", mpd_url);
        return;
    }

    for rep in set.representations {
        let rep = rep.inherit(&set.attrs);
        if rep.protected {
            continue;
        }

        let kind = rep.kind().to_string();
        if kind != "video" && kind != "audio" {
            continue;
        }

        let bases = outer_bases
            .iter()
            .copied()
            .chain([set.attrs.base_url.as_deref(), rep.base_url.as_deref()])
            .flatten()
            .fold(None::<String>, |acc, base| {
                Some(resolve_url(acc.as_deref().unwrap_or(mpd_url), base))
            });

        let format_id = match rep.id.as_deref() {
            Some(id) => format!("dash-{}", id),
            None => format!("dash-{}", formats.len()),
        };

        let mut format = StreamFormat::new(
            format_id,
            bases.unwrap_or_else(|| mpd_url.to_string()),
            Protocol::Dash,
        );
        format.manifest_url = Some(mpd_url.to_string());
        format.tbr = rep.bandwidth.map(|b| b as f64 / 1000.0);
        format.width = rep.width;
        format.height = rep.height;
        format.fps = rep.frame_rate;
        format.ext = match (kind.as_str(), rep.mime_type.as_deref()) {
            ("audio", Some("audio/mp4")) => Some("m4a".to_string()),
            (_, Some(mime)) => mime.split('/').nth(1).map(str::to_string),
            _ => None,
        };

        let codecs = rep.codecs.unwrap_or_default();
        if kind == "audio" {
            format.vcodec = Some("none".to_string());
            format.acodec = (!codecs.is_empty()).then_some(codecs);
        } else {
            let (video, audio) = split_codecs(&codecs);
            format.vcodec = video.or_else(|| (!codecs.is_empty()).then_some(codecs));
            format.acodec = Some(audio.unwrap_or_else(|| "none".to_string()));
        }

        formats.push(format);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MPD: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<MPD xmlns="urn:mpeg:dash:schema:mpd:2011" type="static" mediaPresentationDuration="PT6M21S">
  <BaseURL>https://cdn.example.com/dash/</BaseURL>
  <Period id="0">
    <AdaptationSet mimeType="video/mp4" contentType="video" frameRate="25">
      <Representation id="v720" bandwidth="2400000" width="1280" height="720" codecs="avc1.4d401f">
        <BaseURL>v720/</BaseURL>
      </Representation>
      <Representation id="v360" bandwidth="800000" width="640" height="360" codecs="avc1.42c01e"/>
    </AdaptationSet>
    <AdaptationSet mimeType="audio/mp4" lang="hi">
      <Representation id="a128" bandwidth="128000" codecs="mp4a.40.2"/>
    </AdaptationSet>
    <AdaptationSet mimeType="video/mp4">
      <ContentProtection schemeIdUri="urn:uuid:edef8ba9-79d6-4ace-a3c8-27dcd51d21ed"/>
      <Representation id="drm1080" bandwidth="5000000" width="1920" height="1080"/>
    </AdaptationSet>
    <AdaptationSet mimeType="text/vtt">
      <Representation id="sub" bandwidth="100"/>
    </AdaptationSet>
  </Period>
</MPD>"#;

    #[test]
    fn clear_representations_become_formats() {
        let url = "https://hses.akamaized.net/videos/ep/manifest.mpd";
        let formats = parse_mpd(MPD, url).unwrap();
        let ids: Vec<_> = formats.iter().map(|f| f.format_id.as_str()).collect();
        assert_eq!(ids, ["dash-v720", "dash-v360", "dash-a128"]);

        let hd = &formats[0];
        assert_eq!(hd.url, "https://cdn.example.com/dash/v720/");
        assert_eq!((hd.width, hd.height), (Some(1280), Some(720)));
        assert_eq!(hd.fps, Some(25.0));
        assert_eq!(hd.tbr, Some(2400.0));
        assert_eq!(hd.acodec.as_deref(), Some("none"));
        assert_eq!(hd.ext.as_deref(), Some("mp4"));

        assert_eq!(formats[1].url, "https://cdn.example.com/dash/");

        let audio = &formats[2];
        assert!(audio.is_audio_only());
        assert_eq!(audio.ext.as_deref(), Some("m4a"));
        assert_eq!(audio.manifest_url.as_deref(), Some(url));
    }

    #[test]
    fn manifest_without_base_url_points_at_itself() {
        let xml = r#"<MPD><Period><AdaptationSet mimeType="video/mp4"><Representation id="1" bandwidth="1000"/></AdaptationSet></Period></MPD>"#;
        let formats = parse_mpd(xml, "https://x.net/m.mpd").unwrap();
        assert_eq!(formats.len(), 1);
        assert_eq!(formats[0].url, "https://x.net/m.mpd");
    }

    #[test]
    fn non_mpd_document_is_rejected() {
        assert!(parse_mpd("<html></html>", "https://x.net/m.mpd").is_err());
    }
}
