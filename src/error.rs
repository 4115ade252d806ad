use wasm_bindgen::JsValue;

#[derive(Debug)]
pub enum CourseError {
    XmlParse(quick_xml::Error),
    MissingRoot,
    UnexpectedRoot { found: String },
    UnexpectedEof { element: String },
}

impl std::fmt::Display for CourseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::XmlParse(e) => write!(f, "XML parse error: {e}"),
            Self::MissingRoot => write!(f, "Document has no root element"),
            Self::UnexpectedRoot { found } => {
                write!(f, "Expected <gpx> root element, found <{found}>")
            }
            Self::UnexpectedEof { element } => {
                write!(f, "Document ends inside <{element}>")
            }
        }
    }
}

impl std::error::Error for CourseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::XmlParse(e) => Some(e),
            _ => None,
        }
    }
}

impl From<quick_xml::Error> for CourseError {
    fn from(e: quick_xml::Error) -> Self {
        Self::XmlParse(e)
    }
}

impl From<CourseError> for JsValue {
    fn from(e: CourseError) -> Self {
        js_sys::Error::new(&e.to_string()).into()
    }
}
