use std::path::Path;

use quote::{format_ident, quote};

/// Generates one `#[test]` per `.holo` program under `bin/tests/programs`,
/// each checked against the expectations embedded in its comments.
///
/// Programs are embedded with `include_str!`, so editing one rebuilds the suite.
#[proc_macro]
pub fn generate_tests(_: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let root_dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("../programs");
    let programs: Vec<_> = walkdir::WalkDir::new(&root_dir)
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .filter(|entry| entry.path().extension() == Some("holo".as_ref()))
        .map(|entry| entry.into_path())
        .collect();

    if programs.is_empty() {
        let message = format!("no .holo programs found in {}", root_dir.display());
        return quote! { compile_error!(#message); }.into();
    }

    let tests = programs.iter().map(|path| {
        let test_ident = format_ident!("test_{}", test_name(path.strip_prefix(&root_dir).unwrap_or(path)));
        let program_path = path.to_string_lossy();
        quote! {
            #[test]
            fn #test_ident() {
                holo_expect(include_str!(#program_path));
            }
        }
    });

    quote! {
        #[ctor::ctor]
        fn init() {
            let _ = env_logger::builder().is_test(true).try_init();
        }

        #(#tests)*
    }
    .into()
}

// errors/missing-semicolon.holo -> errors_missing_semicolon
fn test_name(relative_path: &Path) -> String {
    relative_path
        .with_extension("")
        .components()
        .map(|component| component.as_os_str().to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join("_")
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c } else { '_' })
        .collect()
}
