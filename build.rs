fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Compile the demo service definitions when the demo feature is enabled
    #[cfg(feature = "demo")]
    {
        let proto_file = "proto/demo.proto";
        if std::path::Path::new(proto_file).exists() {
            tonic_build::configure()
                .build_server(true)
                .build_client(true)
                .compile_protos(&[proto_file], &["proto"])?;
        }
    }

    Ok(())
}
