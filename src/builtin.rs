pub const BUILTIN_CSS: &str = include_str!("builtin.css");

/// Client-side search and tag filtering for list pages. Same rules as
/// `PostListController::visible_posts`.
pub const FILTER_JS: &str = r#"(function () {
  var input = document.getElementById("br-search");
  var buttons = Array.prototype.slice.call(document.querySelectorAll(".br-tags .br-tag"));
  var cards = Array.prototype.slice.call(document.querySelectorAll(".post-card"));
  var empty = document.getElementById("br-empty");
  var selected = null;

  function apply() {
    var needle = input ? input.value.toLowerCase() : "";
    var shown = 0;
    cards.forEach(function (card) {
      var title = card.getAttribute("data-title") || "";
      var body = card.getAttribute("data-body") || "";
      var tags = (card.getAttribute("data-tags") || "").split(" ");
      var ok = (needle === "" || title.indexOf(needle) !== -1 ||
          body.indexOf(needle) !== -1) &&
        (selected === null || tags.indexOf(selected) !== -1);
      card.hidden = !ok;
      if (ok) shown += 1;
    });
    if (empty) empty.hidden = shown !== 0;
  }

  buttons.forEach(function (button) {
    button.addEventListener("click", function () {
      var tag = button.getAttribute("data-tag");
      selected = selected === tag ? null : tag;
      buttons.forEach(function (b) {
        b.classList.toggle("selected", b.getAttribute("data-tag") === selected);
      });
      apply();
    });
  });

  if (input) input.addEventListener("input", apply);
  apply();
})();"#;
