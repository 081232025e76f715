use crate::catalog::ShirtColor;
use crate::shot::ShotType;

const CLOSE_UP_COMPOSITION: &str = "**Shot Composition:** Create a tightly cropped shot focusing on the torso to emphasize the t-shirt graphic and fabric texture. The model's head may be partially or completely out of the frame.";

const FULL_BODY_COMPOSITION: &str = "**Shot Composition:** Capture the model from the waist-up, knees-up, or full body. The pose should be dynamic and engaging, suitable for a fashion lookbook.";

const OBJECTIVE: &str = "**Objective:** Create a single, unique, hyper-realistic, 4K resolution, editorial-style product mock-up photo of a person wearing the provided t-shirt design. The final image must be in a 1:1 aspect ratio.";

const REQUIREMENTS: &str = r#"**Key requirements:**
1.  **Unique & Dynamic Pose:** The model must be in a different, natural, and engaging pose for each generated image. The pose should look candid and professional, suitable for a modern fashion lookbook (e.g., walking, leaning, looking away from the camera, interacting with the environment).
2.  **Preserve the Original Design:** Faithfully reproduce the graphic from the uploaded image. The graphic must not be altered, stretched, or distorted.
3.  **Modern & Realistic Fabric:** The t-shirt must be made of premium, modern cotton. Show realistic fabric texture, details, wrinkles, and folds. Avoid a "vintage" or "faded" look.
4.  **Seamless Graphic Integration:** The printed graphic must blend perfectly with the fabric, conforming to all shadows, highlights, and textures, making it look like a high-quality screen print.
5.  **Professional Lighting:** Use soft, multi-source studio lighting that creates depth and dimension. This should result in realistic shading and subtle highlights on the fabric.
6.  **Model & Style:** The model should have a contemporary, stylish appearance. The overall focus must remain on the t-shirt.
7.  **Background:** A clean, neutral, minimalist studio background (e.g., light gray, off-white, or a soft concrete texture).
8.  **Overall Style:** The final image must be photorealistic, sharp, high-fashion, and suitable for a professional e-commerce store or social media campaign."#;

const AVOID: &str = r#"**What to avoid:**
-   Repetitive or static poses.
-   Unrealistic or "floating" print overlays.
-   Glossy, plastic-like, or overly smooth fabric.
-   Flat, harsh, or unnatural lighting.
-   A vintage, faded, or "oldschool" aesthetic.
-   Distorted proportions or AI-generated artifacts.
-   Cartoonish or illustrative styles."#;

pub fn shot_composition(shot: ShotType) -> &'static str {
    match shot {
        ShotType::Full => FULL_BODY_COMPOSITION,
        ShotType::CloseUp => CLOSE_UP_COMPOSITION,
    }
}

/// Instruction sent alongside the uploaded graphic for one mockup.
pub fn build_prompt(color: ShirtColor, shot: ShotType) -> String {
    format!(
        "{OBJECTIVE}\n\n**T-Shirt Color:** {}\n\n{}\n\n{REQUIREMENTS}\n\n{AVOID}",
        color.name(),
        shot_composition(shot)
    )
}
