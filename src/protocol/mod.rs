//! Length-prefixed MessagePack wire protocol

pub mod codec;

pub use codec::{
    decode_control, decode_control_payload, decode_frame, decode_frame_payload, encode_control,
    encode_frame, read_message, write_message, ControlMessage, FramePayload, PixelHand,
    LENGTH_PREFIX_SIZE, MAX_MESSAGE_SIZE,
};
