fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Use the vendored protoc so builds don't depend on a system install
    let protoc_path = protoc_bin_vendored::protoc_bin_path().map_err(|e| e.to_string())?;
    unsafe {
        std::env::set_var("PROTOC", protoc_path);
    }

    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR")?;
    let proto_dir = std::path::Path::new(&manifest_dir).join("proto");
    let laptop_proto = proto_dir.join("laptop.proto");

    println!("cargo:rerun-if-changed={}", laptop_proto.display());

    tonic_prost_build::configure()
        .build_server(true)
        .build_client(true)
        .compile_protos(&[laptop_proto], &[proto_dir])?;

    Ok(())
}
