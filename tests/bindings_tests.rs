mod common;

#[cfg(test)]
mod tests {
    use super::common;
    use base64::{engine::general_purpose, Engine as _};
    use rstest::rstest;
    use wasmwrap::bindings::types::TypeError;
    use wasmwrap::bindings::{Artifacts, InstantiationMode, Wrapper};
    use wasmwrap::config::OutputConfig;
    use wasmwrap::{generate, Error};

    fn bindings(binary: &[u8], mode: InstantiationMode) -> (Wrapper, String) {
        match generate(binary, &OutputConfig::wrapper(mode).with_declarations()).unwrap() {
            Artifacts::Bindings {
                wrapper,
                declarations: Some(declarations),
            } => (wrapper, declarations),
            other => panic!("expected wrapper and declarations, got {:?}", other),
        }
    }

    fn embedded(wrapper: &Wrapper) -> Vec<u8> {
        let start = wrapper.source.find("const wasm = \"").unwrap() + "const wasm = \"".len();
        let end = start + wrapper.source[start..].find('"').unwrap();
        general_purpose::STANDARD.decode(&wrapper.source[start..end]).unwrap()
    }

    fn exports_interface(declarations: &str) -> &str {
        let start = declarations.find("export interface Exports").unwrap();
        let end = start + declarations[start..].find("\n\n").unwrap();
        &declarations[start..end]
    }

    #[test]
    fn fibonacci_declarations() {
        let (_, declarations) = bindings(&common::fibonacci(), InstantiationMode::Sync);
        assert_eq!(
            declarations,
            "export interface Imports {}\n\
             \n\
             export interface Exports {\n  fibonacci(arg0: number): number;\n}\n\
             \n\
             declare const instantiate: (imports: Imports) => Exports;\n\
             export default instantiate;\n"
        );
    }

    #[rstest]
    #[case::sync(InstantiationMode::Sync)]
    #[case::asynchronous(InstantiationMode::Async)]
    fn wrapper_embeds_the_exact_binary(#[case] mode: InstantiationMode) {
        let binary = common::fibonacci();
        let (wrapper, _) = bindings(&binary, mode);
        assert_eq!(embedded(&wrapper), binary);
        assert_eq!(wrapper.entry_point, "instantiate");
        assert!(wrapper.source.ends_with("export default instantiate;\n"));
    }

    #[test]
    fn sync_and_async_declare_the_same_exports() {
        let binary = common::env_import_module();
        let (_, sync) = bindings(&binary, InstantiationMode::Sync);
        let (_, asynchronous) = bindings(&binary, InstantiationMode::Async);
        assert_eq!(exports_interface(&sync), exports_interface(&asynchronous));
        assert!(sync.contains("=> Exports;\n"));
        assert!(asynchronous.contains("=> Promise<Exports>;\n"));
    }

    #[test]
    fn generation_is_idempotent() {
        let binary = common::env_import_module();
        let output = OutputConfig::wrapper(InstantiationMode::Async).with_declarations();
        assert_eq!(generate(&binary, &output).unwrap(), generate(&binary, &output).unwrap());
    }

    #[test]
    fn env_import_scenario() {
        let (_, declarations) = bindings(&common::env_import_module(), InstantiationMode::Sync);
        assert!(declarations.contains(
            "export interface Imports {\n  env: {\n    log(arg0: number): void;\n  };\n}\n"
        ));
        assert!(declarations.contains("export interface Exports {\n  run(): number;\n}\n"));
    }

    #[test]
    fn unsupported_type_produces_no_artifacts() {
        let output = OutputConfig::wrapper(InstantiationMode::Sync).with_declarations();
        assert!(matches!(
            generate(&common::v128_module(), &output),
            Err(Error::Type(TypeError::UnsupportedType { tag: 0x7b }))
        ));
    }

    #[test]
    fn multi_value_return_produces_no_artifacts() {
        use wasmwrap::parser::encoding::*;

        let binary = common::module(&[
            (
                SECTION_TYPE,
                common::vec_of(&[common::func_type(&[], &[VALTYPE_I32, VALTYPE_I32])]),
            ),
            (SECTION_FUNCTION, common::vec_of(&[vec![0x00]])),
            (SECTION_EXPORT, common::vec_of(&[common::export("pair", DESC_FUNC, 0)])),
            (
                SECTION_CODE,
                common::vec_of(&[common::body(&[0x41, 0x01, 0x41, 0x02, 0x0b])]),
            ),
        ]);
        let output = OutputConfig::wrapper(InstantiationMode::Sync).with_declarations();
        assert!(matches!(
            generate(&binary, &output),
            Err(Error::Type(TypeError::MultiValueReturn { count: 2 }))
        ));
    }

    #[test]
    fn binary_output_is_untouched() {
        let binary = common::fibonacci();
        assert_eq!(
            generate(&binary, &OutputConfig::binary()).unwrap(),
            Artifacts::Binary(binary)
        );
    }
}
