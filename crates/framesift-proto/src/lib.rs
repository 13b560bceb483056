pub mod proto {
    include!(concat!(env!("OUT_DIR"), "/framesift.rs"));
}
