pub mod bin_data;
pub mod char_shape;
pub mod ctrl_header;
pub mod document;
pub mod id_mappings;
pub mod list_header;
pub mod para_char_shape;
pub mod para_line_seg;
pub mod para_shape;
pub mod paragraph;
pub mod reference;
pub mod shape;
pub mod style;

pub use self::char_shape::{CharShape, FaceName};
pub use self::ctrl_header::{ControlId, CtrlHeader};
pub use self::document::{DocumentHeader, FormatTag, HwpDocument};
pub use self::id_mappings::IdMappings;
pub use self::list_header::{CellAddr, ListHeader};
pub use self::para_char_shape::{CharPositionShape, ParaCharShape};
pub use self::para_line_seg::ParaLineSeg;
pub use self::para_shape::ParaShape;
pub use self::paragraph::{
    assign_references, Cell, Image, Paragraph, Row, Run, Section, Table, TextBox,
};
pub use self::shape::{ShapeComponent, ShapeComponentPicture};
pub use self::style::Style;
