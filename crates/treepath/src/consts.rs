pub const XML_NAMESPACE: &str = "http://www.w3.org/XML/1998/namespace";
/// `xml:id` in Clark notation.
pub const XML_ID_ATTRIBUTE: &str = "{http://www.w3.org/XML/1998/namespace}id";
