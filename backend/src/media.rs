use ffmpeg_next as ffmpeg;
use ffmpeg_next::format::{Pixel, input};
use ffmpeg_next::media::Type;
use ffmpeg_next::software::scaling::{context::Context as ScalingContext, flag::Flags};
use ffmpeg_next::util::frame::video::Video;
use image::RgbImage;
use std::io::Write;
use tempfile::NamedTempFile;

use crate::error::AnalysisError;

fn decode_err(context: &str, err: ffmpeg::Error) -> AnalysisError {
    AnalysisError::Decode(format!("{}: {}", context, err))
}

/// Decodes an uploaded still image into RGB.
pub fn decode_image(data: &[u8]) -> Result<RgbImage, AnalysisError> {
    let image = image::load_from_memory(data)
        .map_err(|e| AnalysisError::Decode(e.to_string()))?
        .to_rgb8();
    let (width, height) = image.dimensions();
    if width == 0 || height == 0 {
        return Err(AnalysisError::InvalidImage { width, height });
    }
    Ok(image)
}

/// Decoded RGB frames of an uploaded video, in presentation order.
///
/// The container is demuxed from a per-request temporary file that is
/// removed when the iterator is dropped.
pub struct VideoFrames {
    input_context: ffmpeg::format::context::Input,
    video_stream_index: usize,
    decoder: ffmpeg::decoder::Video,
    scaler: ScalingContext,
    width: u32,
    height: u32,
    eof_sent: bool,
    finished: bool,
    _file: NamedTempFile,
}

impl VideoFrames {
    pub fn from_bytes(data: &[u8]) -> Result<Self, AnalysisError> {
        let mut file = tempfile::Builder::new()
            .prefix("upload-")
            .suffix(".mp4")
            .tempfile()?;
        file.write_all(data)?;
        file.flush()?;

        ffmpeg::init().map_err(|e| decode_err("failed to initialise ffmpeg", e))?;

        let input_context =
            input(&file.path()).map_err(|e| decode_err("cannot open video", e))?;
        let video_stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or_else(|| AnalysisError::Decode("no video stream".into()))?;
        let video_stream_index = video_stream.index();

        let context_decoder = ffmpeg::codec::context::Context::from_parameters(
            video_stream.parameters(),
        )
        .map_err(|e| decode_err("unsupported codec parameters", e))?;
        let decoder = context_decoder
            .decoder()
            .video()
            .map_err(|e| decode_err("cannot open decoder", e))?;

        let width = decoder.width();
        let height = decoder.height();
        if width == 0 || height == 0 {
            return Err(AnalysisError::InvalidImage { width, height });
        }

        let scaler = ScalingContext::get(
            decoder.format(),
            width,
            height,
            Pixel::RGB24,
            width,
            height,
            Flags::BILINEAR,
        )
        .map_err(|e| decode_err("cannot convert pixel format", e))?;

        Ok(Self {
            input_context,
            video_stream_index,
            decoder,
            scaler,
            width,
            height,
            eof_sent: false,
            finished: false,
            _file: file,
        })
    }

    fn decode_next_frame(&mut self) -> Result<Option<Video>, ffmpeg::Error> {
        loop {
            let mut decoded = Video::empty();
            if self.decoder.receive_frame(&mut decoded).is_ok() {
                return Ok(Some(decoded));
            }

            let mut packets = self.input_context.packets();
            loop {
                match packets.next() {
                    Some((stream, packet)) => {
                        if stream.index() == self.video_stream_index {
                            self.decoder.send_packet(&packet)?;
                            break;
                        }
                    }
                    // buffered frames were drained by the receive above
                    None if self.eof_sent => return Ok(None),
                    None => {
                        self.decoder.send_eof()?;
                        self.eof_sent = true;
                        if self.decoder.receive_frame(&mut decoded).is_ok() {
                            return Ok(Some(decoded));
                        }
                        return Ok(None);
                    }
                }
            }
        }
    }

    fn to_rgb(&mut self, decoded: &Video) -> Result<RgbImage, AnalysisError> {
        let mut rgb_frame = Video::empty();
        self.scaler
            .run(decoded, &mut rgb_frame)
            .map_err(|e| decode_err("pixel conversion failed", e))?;

        let data = rgb_frame.data(0);
        let stride = rgb_frame.stride(0);
        let width = self.width as usize;
        let height = self.height as usize;

        // rows are padded to `stride`
        let mut pixels = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            let row_start = y * stride;
            pixels.extend_from_slice(&data[row_start..row_start + width * 3]);
        }

        RgbImage::from_raw(self.width, self.height, pixels)
            .ok_or_else(|| AnalysisError::Decode("frame buffer size mismatch".into()))
    }
}

impl Iterator for VideoFrames {
    type Item = Result<RgbImage, AnalysisError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.decode_next_frame() {
            Ok(Some(decoded)) => {
                let frame = self.to_rgb(&decoded);
                if frame.is_err() {
                    self.finished = true;
                }
                Some(frame)
            }
            Ok(None) => {
                self.finished = true;
                None
            }
            Err(e) => {
                self.finished = true;
                Some(Err(decode_err("frame decode failed", e)))
            }
        }
    }
}
