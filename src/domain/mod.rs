//! Domain Layer - 领域层
//!
//! - Voice Context: 语言、性别、音色、音频格式
//! - 文本清洗与分段

pub mod voice;

mod text_segmenter;

pub use text_segmenter::{
    sanitize_text, segment_text, SegmentConfig, SegmentError, Segments,
    TextSegment, DEFAULT_MAX_CHARS,
};
