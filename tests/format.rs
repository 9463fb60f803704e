//! Image format token and extension parsing tests.

use vtg::{ImageFormat, ThumbnailError};

#[test]
fn tokens_with_and_without_leading_dot() {
    for (token, expected) in [
        ("png", ImageFormat::Png),
        (".png", ImageFormat::Png),
        ("jpg", ImageFormat::Jpeg),
        (".jpg", ImageFormat::Jpeg),
        ("jpeg", ImageFormat::Jpeg),
        (".jpeg", ImageFormat::Jpeg),
    ] {
        assert_eq!(ImageFormat::from_token(token).unwrap(), expected, "token {token}");
    }
}

#[test]
fn unknown_token_keeps_original_spelling() {
    let error = ImageFormat::from_token(".gif").unwrap_err();
    assert!(matches!(&error, ThumbnailError::InvalidFormatToken(token) if token == ".gif"));
    assert!(error.is_validation());

    let message = error.to_string();
    assert!(message.contains("'.gif'"), "{message}");
    assert!(message.contains("'png', 'jpg', and 'jpeg'"), "{message}");
}

#[test]
fn only_one_leading_dot_is_stripped() {
    assert!(ImageFormat::from_token("..png").is_err());
    assert!(ImageFormat::from_token("").is_err());
    assert!(ImageFormat::from_token(".").is_err());
}

#[test]
fn tokens_are_case_sensitive() {
    assert!(ImageFormat::from_token("PNG").is_err());
    assert!(ImageFormat::from_token(".Jpg").is_err());
    assert_eq!(ImageFormat::from_extension("JPEG"), None);
}

#[test]
fn canonical_extensions() {
    assert_eq!(ImageFormat::Png.extension(), "png");
    assert_eq!(ImageFormat::Jpeg.extension(), "jpg");
    assert_eq!(ImageFormat::default(), ImageFormat::Png);
    assert_eq!(ImageFormat::Jpeg.to_string(), "jpg");
}

#[test]
fn from_str_matches_from_token() {
    let parsed: ImageFormat = "jpeg".parse().unwrap();
    assert_eq!(parsed, ImageFormat::Jpeg);
    assert!("webp".parse::<ImageFormat>().is_err());
}

#[test]
fn encoder_formats() {
    assert_eq!(ImageFormat::Png.encoder_format(), image::ImageFormat::Png);
    assert_eq!(ImageFormat::Jpeg.encoder_format(), image::ImageFormat::Jpeg);
}

#[test]
fn supported_extensions_drive_parsing_and_messages() {
    for extension in ImageFormat::SUPPORTED_EXTENSIONS {
        assert!(ImageFormat::from_extension(extension).is_some(), "{extension}");
        assert!(ImageFormat::from_token(extension).is_ok(), "{extension}");
    }

    let token_message = ImageFormat::from_token("bmp").unwrap_err().to_string();
    let extension_message = vtg::resolve_format(Some(std::path::Path::new("out.bmp")), None)
        .unwrap_err()
        .to_string();
    for extension in ImageFormat::SUPPORTED_EXTENSIONS {
        assert!(token_message.contains(&format!("'{extension}'")), "{token_message}");
        assert!(extension_message.contains(extension), "{extension_message}");
    }
    assert!(
        extension_message.contains("Supported extensions are: png, jpg, jpeg."),
        "{extension_message}"
    );
}
